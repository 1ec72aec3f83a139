//! Static analysis over parsed Crux programs.
//!
//! Everything here works on the AST alone; nothing is evaluated and no
//! random value is drawn, so results are stable across runs even for
//! programs full of random ranges. Editors use the offset groupings to
//! highlight the step numbers feeding each structural layer of the final
//! expression:
//!
//! ```
//! use crux_types::SourceFile;
//!
//! let source = SourceFile::new("<demo>", "[0]*[1], [2]");
//! let program = crux_parser::parse(&source).unwrap();
//! assert_eq!(crux_analysis::depths_from_root(&program), vec![1, 1, 0]);
//! assert_eq!(
//!     crux_analysis::offsets_at_depth(&program, 1),
//!     vec![vec![1], vec![5]]
//! );
//! ```

mod depths;
mod indices;
mod info;

pub use depths::{leaf_infos, LeafInfo};
pub use indices::{depths_from_root, height_from_leaves, offsets_at_depth, offsets_at_or_above};
pub use info::{program_info, ProgramInfo};
