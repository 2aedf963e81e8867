//! Typed handles for backend-owned objects.
//!
//! Every object a backend creates is referred to through one of these newtypes,
//! so passing a buffer where a program or a slot is expected does not compile.

/// A rendering context created by a backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ContextId(u32);

/// A color or depth render buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferHandle(u32);

/// Uploaded vertex + index data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MeshHandle(u32);

/// A linked shader program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramHandle(u32);

impl ContextId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl BufferHandle {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl MeshHandle {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl ProgramHandle {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Resolved vertex attribute location inside a linked program.
///
/// `UNRESOLVED` marks a name the program does not declare.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct AttributeSlot(Option<u32>);

/// Resolved uniform binding inside a linked program.
///
/// `UNRESOLVED` marks a name the program does not declare.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct UniformSlot(Option<u32>);

impl AttributeSlot {
    pub const UNRESOLVED: Self = Self(None);

    #[inline]
    pub const fn at(location: u32) -> Self {
        Self(Some(location))
    }

    #[inline]
    pub const fn location(self) -> Option<u32> {
        self.0
    }

    #[inline]
    pub const fn is_resolved(self) -> bool {
        self.0.is_some()
    }
}

impl UniformSlot {
    pub const UNRESOLVED: Self = Self(None);

    #[inline]
    pub const fn at(binding: u32) -> Self {
        Self(Some(binding))
    }

    #[inline]
    pub const fn binding(self) -> Option<u32> {
        self.0
    }

    #[inline]
    pub const fn is_resolved(self) -> bool {
        self.0.is_some()
    }
}
