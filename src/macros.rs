/// Returns early with `$err` when `$cond` does not hold.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

/// Asserts that `$result` failed with exactly `$err`.
#[cfg(test)]
macro_rules! assert_err {
    ($result:expr, $err:expr $(,)?) => {
        match $result {
            Err(e) => assert_eq!(e, $err),
            Ok(_) => panic!("expected error `{:?}`, got `Ok`", $err),
        }
    };
}

/// Logs a failed verification check and returns `false`.
macro_rules! reject {
    ($($arg:tt)+) => {{
        log::debug!($($arg)+);
        return false;
    }};
}
