/// Extends a JSON pointer with unencoded tokens: `join_ptr!(ptr, "properties", name)`.
#[macro_export]
macro_rules! join_ptr {
    ( $x:expr, $( $y:expr ),* ) => {
        {
            let mut p: jsonptr::Pointer = $x.clone();
            $(
                p.push_back(jsonptr::Token::new($y));
            )*
            p
        }
    };
}

/// Builds a JSON pointer from the document root: `ptr!("components", "schemas", name)`.
#[macro_export]
macro_rules! ptr {
    ( $( $y:expr ),* ) => {
        $crate::join_ptr!(jsonptr::Pointer::root(), $( $y ),*)
    };
}
