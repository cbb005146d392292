//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is a 64-bit hash identifying types and members. Hashes are
//! computed from qualified names and signatures, so the same declaration always
//! gets the same identity regardless of walk order, and identities computed in
//! one assembly match the ones recorded in prior-assembly metadata snapshots.
//!
//! # Examples
//!
//! ```
//! use jsxlate_core::TypeHash;
//!
//! let a = TypeHash::from_name("App.Person");
//! assert_eq!(a, TypeHash::from_name("App.Person"));
//!
//! let m1 = TypeHash::from_member(a, "Greet", &[TypeHash::from_name("System.String")], 0);
//! let m2 = TypeHash::from_member(a, "Greet", &[TypeHash::from_name("System.Int32")], 0);
//! assert_ne!(m1, m2);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
///
/// Different entity kinds (types, members, remote handles) mix in a different
/// constant so they never share a hash even when their names coincide.
pub mod hash_constants {
    /// Separator constant for path components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for member hashes.
    pub const MEMBER: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for generic instantiations.
    pub const GENERIC: u64 = 0x3e9f5d2a8c7b1403;

    /// Domain marker for remote handles.
    pub const REMOTE: u64 = 0x9a7f3d5e2b8c4601;

    /// Parameter position mixing constants.
    /// Each position gets its own constant so parameter order matters.
    pub const PARAM_MARKERS: [u64; 16] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
        0x7c3e9f2a5b8d1403,
        0x5d8c7b4a3e9f2106,
        0x3f1e9d8c7b5a4203,
        0x1a2b3c4d5e6f7089,
        0x9f8e7d6c5b4a3210,
        0x2468ace013579bdf,
        0xfdb97531eca86420,
        0x123456789abcdef0,
    ];
}

#[inline]
fn mix_positional(mut hash: u64, parts: &[TypeHash]) -> u64 {
    for (i, part) in parts.iter().enumerate() {
        let marker = hash_constants::PARAM_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
        // wrapping_mul keeps the combination order-sensitive
        hash = hash.wrapping_mul(hash_constants::SEP).wrapping_add(marker ^ part.0);
    }
    hash
}

/// A deterministic 64-bit hash identifying a type or member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a fully qualified type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create the hash of a generic instantiation from its definition and type arguments.
    #[inline]
    pub fn from_generic(definition: TypeHash, args: &[TypeHash]) -> Self {
        if args.is_empty() {
            return definition;
        }
        TypeHash(mix_positional(definition.0 ^ hash_constants::GENERIC, args))
    }

    /// Create a member hash from owner type, member name, parameter types and generic arity.
    ///
    /// Parameter order matters; overloads that differ only in parameter types
    /// produce distinct hashes.
    #[inline]
    pub fn from_member(owner: TypeHash, name: &str, params: &[TypeHash], generic_arity: u32) -> Self {
        let seed = hash_constants::MEMBER
            ^ owner.0
            ^ xxh64(name.as_bytes(), u64::from(generic_arity));
        TypeHash(mix_positional(seed, params))
    }

    /// Create the hash backing a remote handle for a member of an assembly.
    #[inline]
    pub fn from_remote(assembly: &str, member: TypeHash) -> Self {
        let seed = hash_constants::REMOTE ^ xxh64(assembly.as_bytes(), 0);
        TypeHash(mix_positional(seed, &[member]))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_hash_determinism() {
        assert_eq!(TypeHash::from_name("App.Person"), TypeHash::from_name("App.Person"));
    }

    #[test]
    fn type_hash_uniqueness() {
        let names = ["App.Person", "App.person", "App.Person2", "Person"];
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(TypeHash::from_name(a), TypeHash::from_name(b), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn member_hash_includes_owner() {
        let a = TypeHash::from_name("A");
        let b = TypeHash::from_name("B");
        assert_ne!(
            TypeHash::from_member(a, "Run", &[], 0),
            TypeHash::from_member(b, "Run", &[], 0)
        );
    }

    #[test]
    fn member_hash_parameter_order_matters() {
        let owner = TypeHash::from_name("A");
        let int = TypeHash::from_name("System.Int32");
        let string = TypeHash::from_name("System.String");
        assert_ne!(
            TypeHash::from_member(owner, "f", &[int, string], 0),
            TypeHash::from_member(owner, "f", &[string, int], 0)
        );
    }

    #[test]
    fn member_hash_generic_arity_matters() {
        let owner = TypeHash::from_name("A");
        assert_ne!(
            TypeHash::from_member(owner, "f", &[], 0),
            TypeHash::from_member(owner, "f", &[], 1)
        );
    }

    #[test]
    fn generic_without_args_is_definition() {
        let list = TypeHash::from_name("List");
        assert_eq!(TypeHash::from_generic(list, &[]), list);
        assert_ne!(
            TypeHash::from_generic(list, &[TypeHash::from_name("System.Int32")]),
            list
        );
    }

    #[test]
    fn remote_hash_depends_on_assembly() {
        let member = TypeHash::from_member(TypeHash::from_name("Server"), "Get", &[], 0);
        assert_ne!(
            TypeHash::from_remote("A", member),
            TypeHash::from_remote("B", member)
        );
    }

    #[test]
    fn many_parameters_supported() {
        let owner = TypeHash::from_name("A");
        let params: Vec<TypeHash> = (0..20)
            .map(|i| TypeHash::from_name(&format!("T{i}")))
            .collect();
        let h1 = TypeHash::from_member(owner, "f", &params, 0);
        let h2 = TypeHash::from_member(owner, "f", &params[..19], 0);
        assert_ne!(h1, h2);
    }

    #[test]
    fn hash_display() {
        assert_eq!(format!("{}", TypeHash(0x1234)), "0x0000000000001234");
        assert_eq!(format!("{:?}", TypeHash(0x1234)), "TypeHash(0x0000000000001234)");
        assert!(TypeHash::EMPTY.is_empty());
    }
}
