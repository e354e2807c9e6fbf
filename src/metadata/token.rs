//! Metadata tokens and the tables they address.

use std::fmt;
use std::hash::{Hash, Hasher};

use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// Identifiers of the metadata tables that the module model addresses.
///
/// The discriminants are the ECMA-335 table numbers, which form the high byte of a
/// [`Token`]. Only tables that carry type-level edges, or that the cleanup operations
/// mutate, are modelled.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, EnumIter, EnumCount, Display)]
#[repr(u8)]
pub enum TableId {
    /// `Module` table (0x00) - The module itself
    Module = 0x00,
    /// `TypeRef` table (0x01) - References to types defined elsewhere
    TypeRef = 0x01,
    /// `TypeDef` table (0x02) - Types defined in this module
    TypeDef = 0x02,
    /// `Field` table (0x04) - Field definitions
    Field = 0x04,
    /// `MethodDef` table (0x06) - Method definitions
    MethodDef = 0x06,
    /// `Param` table (0x08) - Method parameters
    Param = 0x08,
    /// `MemberRef` table (0x0A) - References to fields and methods of other types
    MemberRef = 0x0A,
    /// `CustomAttribute` table (0x0C) - Attribute applications
    CustomAttribute = 0x0C,
    /// `StandAloneSig` table (0x11) - Local variable and `calli` signatures
    StandAloneSig = 0x11,
    /// `Event` table (0x14) - Event definitions
    Event = 0x14,
    /// `Property` table (0x17) - Property definitions
    Property = 0x17,
    /// `ModuleRef` table (0x1A) - References to other modules
    ModuleRef = 0x1A,
    /// `TypeSpec` table (0x1B) - Constructed types (generic instances, arrays, ...)
    TypeSpec = 0x1B,
    /// `AssemblyRef` table (0x23) - References to other assemblies
    AssemblyRef = 0x23,
    /// `ManifestResource` table (0x28) - Embedded and linked resources
    ManifestResource = 0x28,
    /// `GenericParam` table (0x2A) - Generic parameters of types and methods
    GenericParam = 0x2A,
    /// `MethodSpec` table (0x2B) - Generic method instantiations
    MethodSpec = 0x2B,
}

impl TableId {
    /// Maps a raw table number to a known table, if it is modelled
    #[must_use]
    pub fn from_u8(value: u8) -> Option<TableId> {
        TableId::iter().find(|table| *table as u8 == value)
    }
}

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table and a row index
    #[must_use]
    pub fn from_parts(table: TableId, row: u32) -> Self {
        Token(((table as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Returns the table this token addresses, if it is a modelled table
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_u8(self.table())
    }

    /// Returns true if this token addresses the given table
    #[must_use]
    pub fn is_table(&self, table: TableId) -> bool {
        self.table() == table as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_token_from_parts() {
        let token = Token::from_parts(TableId::TypeDef, 5);
        assert_eq!(token.value(), 0x02000005);
        assert_eq!(token.row(), 5);
        assert!(token.is_table(TableId::TypeDef));
        assert!(!token.is_table(TableId::TypeRef));
    }

    #[test]
    fn test_token_table() {
        let token = Token(0x06000001);
        assert_eq!(token.table(), 0x06);
        assert_eq!(token.table_id(), Some(TableId::MethodDef));

        let token2 = Token(0x1B000003);
        assert_eq!(token2.table_id(), Some(TableId::TypeSpec));

        let unknown = Token(0x70000001);
        assert_eq!(unknown.table_id(), None);
    }

    #[test]
    fn test_token_row_masks_table() {
        let token = Token::from_parts(TableId::MemberRef, 0x01FF_FFFF);
        assert_eq!(token.row(), 0x00FF_FFFF);
        assert!(token.is_table(TableId::MemberRef));
    }

    #[test]
    fn test_token_null() {
        assert!(Token(0).is_null());
        assert!(!Token::from_parts(TableId::Module, 1).is_null());
        assert!(Token::default().is_null());
    }

    #[test]
    fn test_token_display_and_debug() {
        let token = Token(0x02000005);
        assert_eq!(format!("{}", token), "0x02000005");
        assert_eq!(
            format!("{:?}", token),
            "Token(0x02000005, table: 0x02, row: 5)"
        );
    }

    #[test]
    fn test_token_hash_and_ordering() {
        let mut map = HashMap::new();
        map.insert(Token(0x02000002), "b");
        map.insert(Token(0x02000001), "a");
        assert_eq!(map.get(&Token(0x02000001)), Some(&"a"));

        let mut tokens = vec![Token(0x02000003), Token(0x01000001), Token(0x02000001)];
        tokens.sort();
        assert_eq!(
            tokens,
            vec![Token(0x01000001), Token(0x02000001), Token(0x02000003)]
        );
    }
}
