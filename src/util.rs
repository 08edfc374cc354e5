//! Small filename and formatting helpers shared by the CLI and workflows.

/// Format a float the way it round-trips through a taxa summary file.
///
/// Whole numbers keep a trailing `.0` (`1.0`, not `1`) and very small or
/// very large magnitudes switch to exponent notation.
pub fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

/// Split a filename into stem and extension.
///
/// The extension starts at the last `.`, unless every character before that
/// dot is also a dot (so `.bashrc` has no extension).
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(dot) if filename[..dot].chars().any(|c| c != '.') => {
            (&filename[..dot], &filename[dot..])
        }
        _ => (filename, ""),
    }
}

/// Final component of a `/`-separated path. A trailing slash yields `""`.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Insert `suffix` between the stem and extension of the basename of `path`.
///
/// ```
/// use taxa_compare::util::add_filename_suffix;
///
/// assert_eq!(add_filename_suffix("/foo/bar/baz.txt", "z"), "bazz.txt");
/// assert_eq!(add_filename_suffix("/foo/", "z"), "z");
/// ```
pub fn add_filename_suffix(path: &str, suffix: &str) -> String {
    let (stem, ext) = split_extension(basename(path));
    format!("{}{}{}", stem, suffix, ext)
}

/// Output filenames for sorted-and-filled copies of `paths`.
///
/// Each name is the input basename with `_sorted_and_filled` inserted before
/// the extension. When two inputs share a basename, every name also gets its
/// input index (`_sorted_and_filled_0`, `_sorted_and_filled_1`, ...).
pub fn sorted_and_filled_filenames<S: AsRef<str>>(paths: &[S]) -> Vec<String> {
    let names: Vec<&str> = paths.iter().map(|p| basename(p.as_ref())).collect();
    let same_filenames = names
        .iter()
        .enumerate()
        .any(|(i, name)| names[..i].contains(name));

    paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let suffix = if same_filenames {
                format!("_sorted_and_filled_{}", i)
            } else {
                "_sorted_and_filled".to_string()
            };
            add_filename_suffix(path.as_ref(), &suffix)
        })
        .collect()
}

/// Capitalize: first character upper-cased, the rest lower-cased.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_filename_suffix() {
        assert_eq!(add_filename_suffix("/foo/bar/baz.txt", "z"), "bazz.txt");
        assert_eq!(add_filename_suffix("baz.txt", "z"), "bazz.txt");
        assert_eq!(add_filename_suffix("/foo/bar/baz", "z"), "bazz");
        assert_eq!(add_filename_suffix("baz", "z"), "bazz");
        assert_eq!(add_filename_suffix("/baz.fasta.txt", "z"), "baz.fastaz.txt");
        assert_eq!(add_filename_suffix("baz.fasta.txt", "z"), "baz.fastaz.txt");
        assert_eq!(add_filename_suffix("/foo/", "z"), "z");
    }

    #[test]
    fn test_split_extension_leading_dots() {
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension("..hidden.txt"), ("..hidden", ".txt"));
        assert_eq!(split_extension(""), ("", ""));
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(0.0880247251673), "0.0880247251673");
        assert_eq!(format_float(0.0), "0.0");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("L18S-1"), "L18s-1");
        assert_eq!(capitalize("broad"), "Broad");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_sorted_and_filled_filenames() {
        assert_eq!(
            sorted_and_filled_filenames(&["/a/ts1.txt", "b/ts2.txt"]),
            vec!["ts1_sorted_and_filled.txt", "ts2_sorted_and_filled.txt"]
        );
        assert_eq!(
            sorted_and_filled_filenames(&["/a/ts.txt", "/b/ts.txt"]),
            vec!["ts_sorted_and_filled_0.txt", "ts_sorted_and_filled_1.txt"]
        );
    }
}
