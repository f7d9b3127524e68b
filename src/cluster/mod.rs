//! Clustering with representative points.
//!
//! ## Why Representatives
//!
//! Agglomerative clustering needs a notion of "distance between clusters".
//! The classic linkages sit at two extremes:
//!
//! | Linkage | Cluster summary | Failure mode |
//! |---------|-----------------|--------------|
//! | Centroid | One point (the mean) | Splits elongated / non-convex shapes |
//! | Single | Every member | Chains through thin bridges and outliers |
//!
//! **CURE** sits between them: each cluster keeps a small, well-scattered set
//! of representative points (at most `R`), shrunk toward the mean by a
//! compression factor. Few representatives plus heavy shrink behaves like the
//! centroid method; many representatives with no shrink behaves like single
//! linkage.
//!
//! ## Usage
//!
//! ```rust
//! use cure::cluster::{Clustering, Cure};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = Cure::new(2).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_eq!(labels[2], labels[3]);
//! assert_ne!(labels[0], labels[2]);
//! ```
//!
//! ## Backends
//!
//! [`Cure`] delegates the actual work to a [`CureBackend`]. The default is
//! [`MergeEngineBackend`]; another implementation of the same contract (for
//! example a native accelerated one) can be swapped in with
//! [`Cure::with_backend`] without changing any calling code.

mod cure;
mod traits;

pub use cure::{Cure, CureConfig, CureFit, MergeEngineBackend, MergeStep};
pub use traits::{Clustering, CureBackend};
