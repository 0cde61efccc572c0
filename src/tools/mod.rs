//! Tool surface: argument validation, rendering and the rmcp tool router.

pub mod format;
pub mod social {
    pub mod tool_router;
}
