//! Concrete [`fileview::Backend`] implementations.
//!
//! - [`MemoryBackend`]: a `RecordBatch` held in memory, with a column builder.
//! - [`TextBackend`]: a plain-text catalog parsed eagerly according to
//!   [`TextOptions`].
//!
//! ```
//! use fileview::FileView;
//! use fileview_backends::MemoryBackend;
//!
//! let backend = MemoryBackend::builder()
//!     .column("x", vec![1.0f64, 2.0, 3.0])
//!     .vector_column("v", 2, vec![0.0f64, 1.0, 2.0, 3.0, 4.0, 5.0])
//!     .finish()
//!     .unwrap();
//! let file = FileView::new(backend).unwrap();
//! assert_eq!(file.to_string(), "<MemoryFile with 2 column(s) and shape (3,)>");
//! let v = file.column("v").unwrap();
//! assert_eq!(v.shape(), vec![3, 2]);
//! ```

#![deny(missing_docs)]

mod memory;
mod options;
mod text;

pub use memory::{MemoryBackend, MemoryBuilder};
pub use options::TextOptions;
pub use text::TextBackend;
