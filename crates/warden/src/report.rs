//! Internal panic helpers for conditions that are always a programmer bug
//! (an unbalanced permission release, a walk-time self-conflict that slipped
//! past validation) rather than a recoverable runtime error.

macro_rules! system_panic (
    ($message:expr) => {{
        if !::std::thread::panicking() {
            ::std::panic!("{}", $crate::report::error_message!($message));
        }
    }};

    ($message:expr, $($args:tt)*) => {
        $crate::report::system_panic!(::std::format!($message, $($args)*))
    };
);

macro_rules! error_message (
    ($message:expr) => {
        ::std::format!(
r#" !! WARDEN INTERNAL ERROR
 !!
 !! This is a bug in warden's permission bookkeeping, not in the action
 !! or view that triggered it.
 !!
 !! Message: {}
 !! File: {}
 !! Line: {}
 !! Column: {}
"#,
            $message,
            ::std::file!(),
            ::std::line!(),
            ::std::column!(),
        )
    };

    ($message:expr, $($args:tt)*) => {
        $crate::report::error_message!(::std::format!($message, $($args)*))
    };
);

pub(crate) use error_message;
pub(crate) use system_panic;
