//! Delimited text interchange - collection export/import and external
//! snapshot imports.
//!
//! All readers in the crate share the same input conventions: the delimiter
//! is sniffed from the header line (comma or semicolon) and header names are
//! matched through normalization, so `Set Code`, `set_code`, and `setCode`
//! all resolve to the same column.

/// Collection export to delimited text
pub mod export;

/// Collection and external snapshot imports from delimited text
pub mod import;

/// Picks the delimiter by counting candidates on the header line.
///
/// Semicolon wins when it outnumbers commas; comma is the default.
pub(crate) fn sniff_delimiter(contents: &str) -> u8 {
    let header = contents.lines().next().unwrap_or("");
    let commas = header.matches(',').count();
    let semicolons = header.matches(';').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Normalizes a header cell for synonym matching: lowercased with
/// everything but letters and digits stripped (spaces, underscores, BOMs).
pub(crate) fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_comma_by_default() {
        assert_eq!(sniff_delimiter("setCode,cardNumber,quantity"), b',');
        assert_eq!(sniff_delimiter(""), b',');
        assert_eq!(sniff_delimiter("justoneheader"), b',');
    }

    #[test]
    fn test_sniff_semicolon_when_dominant() {
        assert_eq!(sniff_delimiter("setCode;cardNumber;quantity"), b';');
        assert_eq!(sniff_delimiter("a;b;c\n1,2;3"), b';');
    }

    #[test]
    fn test_normalize_header_variants() {
        assert_eq!(normalize_header("setCode"), "setcode");
        assert_eq!(normalize_header("Set Code"), "setcode");
        assert_eq!(normalize_header("set_code"), "setcode");
        assert_eq!(normalize_header("SET-CODE"), "setcode");
        assert_eq!(normalize_header("\u{feff}setCode"), "setcode");
    }
}
