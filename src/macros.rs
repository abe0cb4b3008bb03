//! 宏集合：让 `select` / `group_by` / `where_map` 等方法接受不定长参数。

#[doc(hidden)]
#[macro_export]
macro_rules! __collect_strings {
    () => {
        Vec::<String>::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut values = Vec::<String>::new();
        $(
            $crate::extend_into_strings($value, &mut values);
        )*
        values
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __collect_pairs {
    ($($key:expr => $value:expr),* $(,)?) => {
        vec![$((
            ::std::string::String::from($key),
            $crate::Operand::from($value),
        )),*]
    };
}

/// 单个字符串或字符串列表都能作为字段参数。
pub trait IntoStrings {
    fn extend_into_strings(self, dst: &mut Vec<String>);
}

impl IntoStrings for String {
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.push(self);
    }
}

impl IntoStrings for &str {
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.push(self.to_string());
    }
}

impl<const N: usize, T> IntoStrings for [T; N]
where
    T: Into<String>,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.into_iter().map(Into::into));
    }
}

impl<T> IntoStrings for &[T]
where
    T: Into<String> + Clone,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.iter().cloned().map(Into::into));
    }
}

impl<T> IntoStrings for Vec<T>
where
    T: Into<String>,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.into_iter().map(Into::into));
    }
}

#[doc(hidden)]
pub fn extend_into_strings<T>(value: T, dst: &mut Vec<String>)
where
    T: IntoStrings,
{
    value.extend_into_strings(dst);
}

#[doc(hidden)]
pub fn collect_into_strings<T>(value: T) -> Vec<String>
where
    T: IntoStrings,
{
    let mut dst = Vec::new();
    value.extend_into_strings(&mut dst);
    dst
}

/// `select_fields!(qb, "id", "name")` 等价于 `qb.select(["id", "name"])`。
#[macro_export]
macro_rules! select_fields {
    ($builder:expr $(, $col:expr)* $(,)?) => {
        $builder.select($crate::__collect_strings!($($col),*))
    };
}
pub use crate::select_fields;

/// `group_by_fields!(qb, "country", "city")`。
#[macro_export]
macro_rules! group_by_fields {
    ($builder:expr $(, $col:expr)* $(,)?) => {
        $builder.group_by($crate::__collect_strings!($($col),*))
    };
}
pub use crate::group_by_fields;

/// `where_map!(qb, "id >" => 3, "status" => "open")`：逐项以 AND 追加条件。
#[macro_export]
macro_rules! where_map {
    ($builder:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $builder.where_map($crate::__collect_pairs!($($key => $value),*))
    };
}
pub use crate::where_map;

/// `set_map!(qb, "name" => "x", "age" => 3)`。
#[macro_export]
macro_rules! set_map {
    ($builder:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $builder.set_map($crate::__collect_pairs!($($key => $value),*))
    };
}
pub use crate::set_map;
