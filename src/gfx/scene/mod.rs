//! # Scene Management Module
//!
//! The scene owns everything that is drawn: generated meshes, matcap
//! materials, the scattered object groups, the optional text mesh and the
//! environment map, plus the camera they are viewed through.
//!
//! Objects reference meshes and materials by [`GeometryId`] and
//! [`MaterialId`], so one mesh is shared by every object of a group and is
//! drawn with a single instanced call.

pub mod mesh;
pub mod object;
pub mod scatter;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use mesh::{DrawMesh, Mesh};
pub use object::{Axis, GeometryId, GroupKind, MaterialId, ObjectGroup, SceneObject, TextMesh};
pub use scatter::{scatter_object, scatter_objects};
pub use scene::{Environment, Scene, SceneStatistics};
pub use vertex::Vertex3D;
