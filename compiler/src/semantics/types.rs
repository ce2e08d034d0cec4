//! Resolved data types.
//!
//! `SyntaxType` is what the parser saw; `DataType` is what the resolver made
//! of it once every base name was bound to a type symbol.

use std::fmt;

use super::ids::{SymbolId, TypeId};

/// A base type bound to the type symbol that declared it.
#[derive(Debug, Clone, Eq)]
pub struct TypeRef {
    pub symbol: SymbolId,
    pub type_id: TypeId,
    pub name: String,
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Base(TypeRef),
    Array(Box<DataType>),
    Tuple(Vec<DataType>),
}

impl DataType {
    pub fn array_of(element: DataType) -> Self {
        DataType::Array(Box::new(element))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Base(base) => f.write_str(&base.name),
            DataType::Array(element) => write!(f, "{element}[]"),
            DataType::Tuple(elements) => {
                f.write_str("(")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(name: &str, raw: u32) -> DataType {
        DataType::Base(TypeRef {
            symbol: SymbolId::from_raw(raw),
            type_id: TypeId::from_raw(raw),
            name: name.to_string(),
        })
    }

    #[test]
    fn base_equality_follows_the_type_id() {
        let renamed = DataType::Base(TypeRef {
            symbol: SymbolId::from_raw(90),
            type_id: TypeId::from_raw(1),
            name: "alias".to_string(),
        });

        assert_eq!(base("i32", 1), renamed);
        assert_ne!(base("i32", 1), base("i32", 2));
    }

    #[test]
    fn composite_types_compare_structurally() {
        let left = DataType::Tuple(vec![base("i32", 1), DataType::array_of(base("str", 2))]);
        let right = DataType::Tuple(vec![base("i32", 1), DataType::array_of(base("str", 2))]);

        assert_eq!(left, right);
        assert_ne!(left, DataType::Tuple(vec![base("i32", 1)]));
        assert_eq!(left.to_string(), "(i32, str[])");
        assert_eq!(
            DataType::array_of(DataType::array_of(base("u8", 3))).to_string(),
            "u8[][]"
        );
    }
}
