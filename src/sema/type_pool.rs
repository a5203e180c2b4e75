// src/sema/type_pool.rs
//
// Interned type pool using TypeId handles for O(1) equality.
//
// - TypeId: u32 handle to an interned type (Copy, trivial Eq/Hash)
// - InternedType: storage, deduplicated through a hash map
// - TypePool: the shared pool; the only lock besides the registry's

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::frontend::ast::TypeExpr;

/// Handle to an interned type. Two handles are equal iff the types are
/// structurally equal, so checking is pointer-like comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> u32 {
        self.0
    }
}

pub type TypeIdVec = SmallVec<[TypeId; 2]>;

/// Stored representation. `Null` is the type of the `null` literal; it
/// unifies with any class type during compatibility checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum InternedType {
    Int,
    Char,
    Boolean,
    Void,
    Null,
    Class { name: String, args: TypeIdVec },
}

/// Pre-interned types for O(1) access.
#[derive(Debug, Clone, Copy)]
pub struct WellKnown {
    pub int: TypeId,
    pub char: TypeId,
    pub boolean: TypeId,
    pub void: TypeId,
    pub null: TypeId,
    pub string: TypeId,
    pub array: TypeId,
}

#[derive(Default)]
struct Arena {
    types: Vec<InternedType>,
    intern_map: FxHashMap<InternedType, TypeId>,
}

impl Arena {
    fn intern(&mut self, ty: InternedType) -> TypeId {
        if let Some(&id) = self.intern_map.get(&ty) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.intern_map.insert(ty, id);
        id
    }

    fn display(&self, id: TypeId) -> String {
        match &self.types[id.0 as usize] {
            InternedType::Int => "int".to_string(),
            InternedType::Char => "char".to_string(),
            InternedType::Boolean => "boolean".to_string(),
            InternedType::Void => "void".to_string(),
            InternedType::Null => "null".to_string(),
            InternedType::Class { name, args } => {
                if args.is_empty() {
                    name.clone()
                } else {
                    let args: Vec<String> =
                        args.iter().map(|&a| self.display(a)).collect();
                    format!("{}<{}>", name, args.join(", "))
                }
            }
        }
    }
}

/// Process-wide interning pool, shared across phases behind a mutex.
/// Contention is low: writes are O(declared types), reads O(checks).
pub struct TypePool {
    arena: Mutex<Arena>,
    well_known: WellKnown,
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    pub fn new() -> Self {
        let mut arena = Arena::default();
        let well_known = WellKnown {
            int: arena.intern(InternedType::Int),
            char: arena.intern(InternedType::Char),
            boolean: arena.intern(InternedType::Boolean),
            void: arena.intern(InternedType::Void),
            null: arena.intern(InternedType::Null),
            string: arena.intern(InternedType::Class {
                name: "String".to_string(),
                args: TypeIdVec::new(),
            }),
            array: arena.intern(InternedType::Class {
                name: "Array".to_string(),
                args: TypeIdVec::new(),
            }),
        };
        Self {
            arena: Mutex::new(arena),
            well_known,
        }
    }

    pub fn well_known(&self) -> &WellKnown {
        &self.well_known
    }

    /// Intern a base name with no generic arguments.
    pub fn intern_base(&self, base: &str) -> TypeId {
        match base {
            "int" => self.well_known.int,
            "char" => self.well_known.char,
            "boolean" => self.well_known.boolean,
            "void" => self.well_known.void,
            _ => self.arena.lock().intern(InternedType::Class {
                name: base.to_string(),
                args: TypeIdVec::new(),
            }),
        }
    }

    /// Intern a syntactic type, recursing through generic arguments.
    pub fn intern_type_expr(&self, ty: &TypeExpr) -> TypeId {
        if ty.generics.is_empty() {
            return self.intern_base(&ty.base);
        }
        let args: TypeIdVec = ty
            .generics
            .iter()
            .map(|arg| self.intern_type_expr(arg))
            .collect();
        self.arena.lock().intern(InternedType::Class {
            name: ty.base.clone(),
            args,
        })
    }

    /// Render a type for diagnostics, e.g. `Array<int>`.
    pub fn display(&self, id: TypeId) -> String {
        self.arena.lock().display(id)
    }

    /// The class name behind a type, if it is a class type.
    pub fn class_name(&self, id: TypeId) -> Option<String> {
        match &self.arena.lock().types[id.index() as usize] {
            InternedType::Class { name, .. } => Some(name.clone()),
            _ => None,
        }
    }

    pub fn is_class(&self, id: TypeId) -> bool {
        matches!(
            self.arena.lock().types[id.index() as usize],
            InternedType::Class { .. }
        )
    }

    /// True for `Array` and any `Array<...>` instantiation.
    pub fn is_array(&self, id: TypeId) -> bool {
        matches!(
            &self.arena.lock().types[id.index() as usize],
            InternedType::Class { name, .. } if name == "Array"
        )
    }

    /// Can a value of type `actual` be used where `expected` is
    /// required? Identity, the Array/Array<T> equivalence, and the
    /// null-with-class unification.
    pub fn compatible(&self, expected: TypeId, actual: TypeId) -> bool {
        if expected == actual {
            return true;
        }
        if self.is_array(expected) && self.is_array(actual) {
            return true;
        }
        if actual == self.well_known.null && self.is_class(expected) {
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::token::Span;

    fn ty(base: &str) -> TypeExpr {
        TypeExpr::new(base, Span::default())
    }

    #[test]
    fn interning_is_canonical() {
        let pool = TypePool::new();
        let a = pool.intern_base("Point");
        let b = pool.intern_base("Point");
        let c = pool.intern_base("Square");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn primitives_are_pre_interned() {
        let pool = TypePool::new();
        assert_eq!(pool.intern_base("int"), pool.well_known().int);
        assert_eq!(pool.intern_base("void"), pool.well_known().void);
        assert_eq!(pool.intern_base("String"), pool.well_known().string);
    }

    #[test]
    fn generic_display_form() {
        let pool = TypePool::new();
        let mut array_int = ty("Array");
        array_int.generics.push(ty("int"));
        let id = pool.intern_type_expr(&array_int);
        assert_eq!(pool.display(id), "Array<int>");
        assert_eq!(pool.display(pool.well_known().array), "Array");
    }

    #[test]
    fn array_generics_are_compatible_with_array() {
        let pool = TypePool::new();
        let mut array_int = ty("Array");
        array_int.generics.push(ty("int"));
        let generic = pool.intern_type_expr(&array_int);
        let plain = pool.well_known().array;
        assert_ne!(generic, plain);
        assert!(pool.compatible(plain, generic));
        assert!(pool.compatible(generic, plain));
    }

    #[test]
    fn null_unifies_with_class_types_only() {
        let pool = TypePool::new();
        let point = pool.intern_base("Point");
        let null = pool.well_known().null;
        assert!(pool.compatible(point, null));
        assert!(pool.compatible(pool.well_known().string, null));
        assert!(!pool.compatible(pool.well_known().int, null));
        assert!(!pool.compatible(pool.well_known().boolean, null));
    }

    #[test]
    fn recursive_hashing_distinguishes_arguments() {
        let pool = TypePool::new();
        let mut array_int = ty("Array");
        array_int.generics.push(ty("int"));
        let mut array_char = ty("Array");
        array_char.generics.push(ty("char"));
        assert_ne!(
            pool.intern_type_expr(&array_int),
            pool.intern_type_expr(&array_char)
        );
        assert_eq!(
            pool.intern_type_expr(&array_int),
            pool.intern_type_expr(&array_int)
        );
    }
}
