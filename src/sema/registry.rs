// src/sema/registry.rs
//
// Thread-safe store of class and subroutine declarations for the whole
// program. The parse phase writes, later phases only read; a single
// mutex protects both directions.

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::SemanticError;
use crate::frontend::ast::{Class, SubroutineKind};
use crate::sema::type_pool::{TypeId, TypePool};

/// Signature of a Jack subroutine as seen from call sites.
#[derive(Debug, Clone)]
pub struct MethodSignature {
    pub return_type: TypeId,
    pub params: Vec<TypeId>,
    pub kind: SubroutineKind,
    pub line: u32,
    pub col: u32,
}

impl MethodSignature {
    /// Functions and constructors dispatch statically (no implicit
    /// `this`); methods take the receiver as argument 0.
    pub fn is_static(&self) -> bool {
        matches!(
            self.kind,
            SubroutineKind::Function | SubroutineKind::Constructor
        )
    }
}

#[derive(Default)]
struct RegistryInner {
    classes: FxHashSet<String>,
    methods: FxHashMap<String, FxHashMap<String, MethodSignature>>,
}

/// Global class/method table shared by every compilation unit.
#[derive(Default)]
pub struct GlobalRegistry {
    inner: Mutex<RegistryInner>,
}

impl GlobalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the Jack OS signatures pre-loaded, so user code
    /// can call the standard API without compiling its sources.
    pub fn with_standard_library(types: &TypePool) -> Self {
        let registry = Self::new();
        registry.load_standard_library(types);
        registry
    }

    /// Returns false if the class name is already taken.
    pub fn register_class(&self, name: &str) -> bool {
        self.inner.lock().classes.insert(name.to_string())
    }

    /// Returns false if the subroutine is already declared in the class.
    pub fn register_method(&self, class: &str, name: &str, sig: MethodSignature) -> bool {
        let mut inner = self.inner.lock();
        let methods = inner.methods.entry(class.to_string()).or_default();
        if methods.contains_key(name) {
            return false;
        }
        methods.insert(name.to_string(), sig);
        true
    }

    /// True for registered classes and the primitive type names.
    pub fn class_exists(&self, name: &str) -> bool {
        matches!(name, "int" | "char" | "boolean" | "void")
            || self.inner.lock().classes.contains(name)
    }

    pub fn method_exists(&self, class: &str, name: &str) -> bool {
        self.inner
            .lock()
            .methods
            .get(class)
            .is_some_and(|m| m.contains_key(name))
    }

    pub fn signature(&self, class: &str, name: &str) -> Option<MethodSignature> {
        self.inner
            .lock()
            .methods
            .get(class)
            .and_then(|m| m.get(name))
            .cloned()
    }

    pub fn class_count(&self) -> usize {
        self.inner.lock().classes.len()
    }

    /// Register a parsed class and all its subroutine signatures.
    /// Called from the parse task as soon as the AST exists.
    pub fn register_class_decl(
        &self,
        class: &Class,
        types: &TypePool,
    ) -> Result<(), SemanticError> {
        if !self.register_class(&class.name) {
            return Err(SemanticError::DuplicateClass {
                name: class.name.clone(),
                span: class.span.into(),
            });
        }

        for sub in &class.subs {
            let sig = MethodSignature {
                return_type: types.intern_type_expr(&sub.return_type),
                params: sub
                    .params
                    .iter()
                    .map(|p| types.intern_type_expr(&p.ty))
                    .collect(),
                kind: sub.kind,
                line: sub.span.line,
                col: sub.span.column,
            };
            if !self.register_method(&class.name, &sub.name, sig) {
                return Err(SemanticError::DuplicateSubroutine {
                    class: class.name.clone(),
                    name: sub.name.clone(),
                    span: sub.span.into(),
                });
            }
        }

        Ok(())
    }

    /// Signatures of the Jack OS classes. Only the signatures are
    /// registered; the library itself is compiled elsewhere.
    fn load_standard_library(&self, types: &TypePool) {
        use SubroutineKind::{Constructor, Function, Method};

        let int = types.well_known().int;
        let char_ = types.well_known().char;
        let boolean = types.well_known().boolean;
        let void = types.well_known().void;
        let string = types.well_known().string;
        let array = types.well_known().array;

        let mut add = |class: &str, name: &str, kind, params: &[TypeId], ret| {
            self.register_class(class);
            self.register_method(
                class,
                name,
                MethodSignature {
                    return_type: ret,
                    params: params.to_vec(),
                    kind,
                    line: 0,
                    col: 0,
                },
            );
        };

        add("Math", "init", Function, &[], void);
        add("Math", "abs", Function, &[int], int);
        add("Math", "multiply", Function, &[int, int], int);
        add("Math", "divide", Function, &[int, int], int);
        add("Math", "min", Function, &[int, int], int);
        add("Math", "max", Function, &[int, int], int);
        add("Math", "sqrt", Function, &[int], int);

        add("String", "new", Constructor, &[int], string);
        add("String", "dispose", Method, &[], void);
        add("String", "length", Method, &[], int);
        add("String", "charAt", Method, &[int], char_);
        add("String", "setCharAt", Method, &[int, char_], void);
        add("String", "appendChar", Method, &[char_], string);
        add("String", "eraseLastChar", Method, &[], void);
        add("String", "intValue", Method, &[], int);
        add("String", "setInt", Method, &[int], void);
        add("String", "backSpace", Function, &[], char_);
        add("String", "doubleQuote", Function, &[], char_);
        add("String", "newLine", Function, &[], char_);

        add("Array", "new", Constructor, &[int], array);
        add("Array", "dispose", Method, &[], void);

        add("Output", "init", Function, &[], void);
        add("Output", "moveCursor", Function, &[int, int], void);
        add("Output", "printChar", Function, &[char_], void);
        add("Output", "printString", Function, &[string], void);
        add("Output", "printInt", Function, &[int], void);
        add("Output", "println", Function, &[], void);
        add("Output", "backSpace", Function, &[], void);

        add("Screen", "init", Function, &[], void);
        add("Screen", "clearScreen", Function, &[], void);
        add("Screen", "setColor", Function, &[boolean], void);
        add("Screen", "drawPixel", Function, &[int, int], void);
        add("Screen", "drawLine", Function, &[int, int, int, int], void);
        add(
            "Screen",
            "drawRectangle",
            Function,
            &[int, int, int, int],
            void,
        );
        add("Screen", "drawCircle", Function, &[int, int, int], void);

        add("Keyboard", "init", Function, &[], void);
        add("Keyboard", "keyPressed", Function, &[], char_);
        add("Keyboard", "readChar", Function, &[], char_);
        add("Keyboard", "readLine", Function, &[string], string);
        add("Keyboard", "readInt", Function, &[string], int);

        add("Memory", "init", Function, &[], void);
        add("Memory", "peek", Function, &[int], int);
        add("Memory", "poke", Function, &[int, int], void);
        add("Memory", "alloc", Function, &[int], int);
        add("Memory", "deAlloc", Function, &[array], void);

        add("Sys", "init", Function, &[], void);
        add("Sys", "halt", Function, &[], void);
        add("Sys", "error", Function, &[int], void);
        add("Sys", "wait", Function, &[int], void);
    }
}
