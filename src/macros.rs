/// Build a `Vec<RowValues>` of positional parameters.
///
/// ```rust
/// use sql_facade::prelude::*;
///
/// let params = params![5, "x", None::<i64>];
/// assert_eq!(params[0], RowValues::Int(5));
/// assert!(params[2].is_null());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::RowValues>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::RowValues::from($value)),+]
    };
}

/// Build [`NamedArgs`](crate::NamedArgs) in the order written.
///
/// ```rust
/// use sql_facade::prelude::*;
///
/// let args = named_args! { "name" => "a", "age" => 3 };
/// assert_eq!(args.names().collect::<Vec<_>>(), ["name", "age"]);
/// ```
#[macro_export]
macro_rules! named_args {
    () => {
        $crate::NamedArgs::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::NamedArgs::new()$(.arg($name, $value))+
    };
}
