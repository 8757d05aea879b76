// HACK: instead of `#[macro_export]` alone we also `pub(crate) use <macro>`
// so that both `crate::macros::<macro>!` and `deposit_batcher::<macro>!`
// resolve, the binary only imports what it needs from the lib
#![allow(unused_imports)]

/// Parses a checksummed address literal, only use with constants
#[macro_export]
macro_rules! parse_address {
    ($addr:tt) => {
        $addr.parse::<alloy::primitives::Address>().unwrap()
    };
}

/// Parses a fork version literal (`0x` + 4 bytes), only use with constants
#[macro_export]
macro_rules! fork_version {
    ($v:tt) => {
        $v.parse::<alloy::primitives::FixedBytes<4>>().unwrap()
    };
}

/// Aligned, colored `key: value` line used by the summary printers
#[macro_export]
macro_rules! format_field {
    ($a: expr, $k:expr, $ck: ident, $v: expr, $cv: ident) => {
        format!(
            "    {:align$}{}\n",
            format!("{}:", $k).$ck().bold(),
            format!("{}", $v).$cv(),
            align = $a
        )
    };
}

pub(crate) use fork_version;
pub(crate) use format_field;
pub(crate) use parse_address;
