//! Single-file component compiler and fine-grained reactive runtime.
//!
//! A component source file mixes three regions: a template (plain
//! markup with `{{expr}}` interpolation, `@event` listeners and
//! `s-model` bindings), a script, and a style block. [`compile`] lowers
//! the template into imperative statements, scopes the styles with a
//! per-compilation attribute, hoists the script's imports, and emits
//! one JavaScript module with the component as its default export.
//!
//! The runtime half implements the reactive engine those modules are
//! compiled against: [`Signal`] cells, [`watch`] effects with automatic
//! dependency tracking, lazily memoized [`Computed`] values, a batched
//! deferred scheduler driven by [`tick`], a position-keyed list
//! [`reconcile`]r and named slot projection — all against the host node
//! tree in [`host`].

mod codegen;
mod compile;
mod parse;
mod scope;

pub mod host;
pub mod runtime;

pub use compile::{compile, compile_with_options, CompileError, CompileOptions, CompileResult};
pub use parse::{ComponentSource, ElementNode, TemplateNode, TextNode};
pub use scope::{generate_scope_id, scope_css};

pub use runtime::{
    batch, clear_slots, computed, get_slot, mount, on_mount, process_slots, reconcile,
    register_slot, render_slot, set_slots, signal, store, tick, untrack, watch, Computed, Effect,
    LiveRow, OnCleanup, Signal, SlotContent, Store,
};
