use std::fmt::{self, Write};

/// Space separated, two column hexadecimal rendering of `data` (ex - `4d 0a 64 65 75`).
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
