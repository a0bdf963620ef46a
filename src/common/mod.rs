mod fs;
mod geom;
mod io;

pub(crate) use fs::*;
pub(crate) use geom::*;
pub(crate) use io::*;

/// Left-pad a numeric code with zeros to the given width.
pub(crate) fn zero_pad(code: &str, width: usize) -> String {
    format!("{:0>width$}", code.trim(), width = width)
}

/// First `n` characters of a code, or the whole code when shorter.
pub(crate) fn code_prefix(code: &str, n: usize) -> &str {
    code.get(..n).unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::{code_prefix, zero_pad};

    #[test]
    fn pads_short_codes() {
        assert_eq!(zero_pad("19", 6), "000019");
        assert_eq!(zero_pad("8", 2), "08");
    }

    #[test]
    fn leaves_full_width_codes() {
        assert_eq!(zero_pad("080193", 6), "080193");
        assert_eq!(zero_pad("08019301001", 11), "08019301001");
    }

    #[test]
    fn trims_before_padding() {
        assert_eq!(zero_pad(" 13 ", 2), "13");
    }

    #[test]
    fn prefixes_clamp_to_length() {
        assert_eq!(code_prefix("08019301001", 6), "080193");
        assert_eq!(code_prefix("08019301001", 2), "08");
        assert_eq!(code_prefix("08", 6), "08");
    }
}
