//! Output path templates.
//!
//! A template may contain printf-style integer verbs (`%d`, `%3d`, `%03d`, `%-3d`) that receive
//! the zero-based position of the input in its batch, `{name}` for the input file name without
//! its extension and `{type}` for the thumbnail variant. Anything else is copied verbatim.

use std::path::{Path, PathBuf};

/// Builds the concrete output path for the `index`-th input of a batch.
pub fn expand_output_path(template: &str, name: &str, variant: &str, index: usize) -> PathBuf {
    let numbered = substitute_index(template, index);
    PathBuf::from(numbered.replace("{name}", name).replace("{type}", variant))
}

/// The `{name}` value for `input`: its file name with the extension stripped.
pub fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn substitute_index(template: &str, index: usize) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match parse_int_verb(after) {
            Some(verb) => {
                out.push_str(&verb.format(index));
                rest = &after[verb.len..];
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

struct IntVerb {
    zero_pad: bool,
    left_align: bool,
    width: usize,
    // bytes consumed after the '%'
    len: usize,
}

impl IntVerb {
    fn format(&self, index: usize) -> String {
        let width = self.width;
        if self.left_align {
            format!("{index:<width$}")
        } else if self.zero_pad {
            format!("{index:0width$}")
        } else {
            format!("{index:>width$}")
        }
    }
}

fn parse_int_verb(s: &str) -> Option<IntVerb> {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut zero_pad = false;
    let mut left_align = false;
    while i < bytes.len() && (bytes[i] == b'0' || bytes[i] == b'-') {
        if bytes[i] == b'0' {
            zero_pad = true;
        } else {
            left_align = true;
        }
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if bytes.get(i) != Some(&b'd') {
        return None;
    }
    let width = s[digits_start..i].parse().unwrap_or(0);
    Some(IntVerb {
        zero_pad,
        left_align,
        width,
        len: i + 1,
    })
}
