#[macro_export]
macro_rules! status {
    ($name:ident,$($arg:tt)*) => ({
        $crate::Status::$name(format!($($arg)*))
    })
}

#[macro_export]
macro_rules! invalid_argument {
    ($($arg:tt)*) => ($crate::status!(invalid_argument, $($arg)*))
}

#[macro_export]
macro_rules! unauthenticated {
    ($($arg:tt)*) => ($crate::status!(unauthenticated, $($arg)*))
}

#[macro_export]
macro_rules! not_found {
    ($($arg:tt)*) => ($crate::status!(not_found, $($arg)*))
}

#[macro_export]
macro_rules! internal {
    ($($arg:tt)*) => ($crate::status!(internal, $($arg)*))
}

#[cfg(test)]
mod tests {
    use crate::Code;

    #[test]
    pub fn macros_use_correct_code() {
        assert_eq!(invalid_argument!("message").code(), Code::InvalidArgument);
        assert_eq!(
            invalid_argument!("bad input: {0}", "some issue").message(),
            "bad input: some issue"
        );
        assert_eq!(not_found!("donation {} not found", "pay_1").code(), Code::NotFound);
        assert_eq!(internal!("boom").code(), Code::Internal);
        assert_eq!(unauthenticated!("who are you").code(), Code::Unauthenticated);
    }
}
