//! `cgt_core` is the engine behind [cgt](https://github.com/cgt-rs/cgt), a line-oriented template expander for generated source code. Templates mix literal text with `[[[...]]]` directives that are resolved against a pluggable [`Resolver`], producing a deterministic list of output lines. Multi-line values keep the column of the directive that produced them, so generated code stays properly indented.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template text
//!   → Lexer (logos tokens walked line by line into Tokens)
//!   → TemplateProcessor (scope stack, alignment stack, output buffer)
//!   → Resolver (values for IF / ELIF / expansion keys, SET assignments)
//!   → Output lines
//! ```
//!
//! ## Directives
//!
//! | Directive                        | Effect                                                     |
//! | -------------------------------- | ---------------------------------------------------------- |
//! | `[[[key]]]`, `[[[key(a, b)]]]`   | Expand the resolved value inline                           |
//! | `[[[IF key comment]]]`           | Open a conditional block; the comment is ignored           |
//! | `[[[ELIF key]]]`, `[[[ELSE]]]`   | Alternative branches                                       |
//! | `[[[ENDIF]]]`                    | Close the innermost block                                  |
//! | `[[[SET name=value]]]`           | Assign through [`Resolver::assign`]                        |
//! | `[[[>]]]`, `[[[\|]]]`, `[[[<]]]` | Push an alignment column, pad to it, pop it                |
//!
//! A line holding nothing but a directive that produces no text leaves no
//! blank line in the output.
//!
//! ## Key Types
//!
//! - [`Resolver`]: Supplies values. Implemented by [`MapResolver`], [`FunctionResolver`], and [`DynamicResolver`].
//! - [`Value`]: Booleans, numbers, text, or a list of lines.
//! - [`TemplateProcessor`]: The interpreter. Most callers use [`expand`] or [`expand_to_string`].
//! - [`LineBuilder`]: Greedy wrapper for preparing long value lists before expansion.
//! - [`TemplateError`]: Every failure, wrapped with the template line it happened on.
//!
//! ## Quick Start
//!
//! ```rust
//! use cgt_core::MapResolver;
//! use cgt_core::expand;
//!
//! let template = "\
//! void init()
//! {
//! [[[IF hasArgs]]]
//!     parse([[[args]]]);
//! [[[ENDIF]]]
//! }";
//!
//! let mut resolver = MapResolver::new()
//! 	.with("hasArgs", true)
//! 	.with("args", vec!["argc,", "argv"]);
//!
//! let lines = expand(template, &mut resolver).unwrap();
//! assert_eq!(lines, vec![
//! 	"void init()",
//! 	"{",
//! 	"    parse(argc,",
//! 	"          argv);",
//! 	"}",
//! ]);
//! ```

pub use error::*;
pub use lexer::Tokens;
pub use lexer::tokenize;
pub use line_builder::*;
pub use naming::*;
pub use processor::*;
pub use resolver::*;
pub use tokens::*;
pub use value::*;

#[allow(unused_assignments)]
mod error;
mod lexer;
pub mod line_builder;
pub mod naming;
mod processor;
mod resolver;
mod tokens;
mod value;

#[cfg(test)]
mod __fixtures;
