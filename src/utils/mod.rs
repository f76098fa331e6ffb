mod bcd;
mod byte_cursor;
mod hexdump;
mod text;
mod time;

pub use self::bcd::{bcd_byte, bcd_to_int};
pub use self::byte_cursor::{ByteCursor, Endianness};
pub use self::hexdump::HexBytes;
pub use self::text::{decode_lossy, language_code, until_nul};
pub use self::time::{decode_duration, decode_start_time};
