#[allow(unused_macros)]
macro_rules! assert_err {
    ($expr:expr, $err:expr) => {
        match $expr {
            Ok(_) => {
                panic!("assertion failed: not an error in `{}`", stringify!($expr));
            }
            Err(ref value) => {
                let desc = value.to_string();
                if !desc.contains($err) {
                    panic!(
                        "assertion failed: error message `{}` doesn't contain `{}` in `{}`",
                        desc,
                        $err,
                        stringify!($expr)
                    );
                }
            }
        }
    };
}

/// Encoded integer header and payload: class 0, version 1, full precision.
#[allow(unused_macros)]
macro_rules! int_bytes {
    ($size:expr, $flags:expr) => {{
        let bytes: [u8; 12] = [0x10, $flags, 0, 0, $size, 0, 0, 0, 0, 0, 8 * $size, 0];
        bytes
    }};
}
