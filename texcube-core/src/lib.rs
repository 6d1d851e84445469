/// texcube core - the textured, auto-rotating cube component
///
/// Host-independent part of the widget: inputs, scene assembly, the camera,
/// the render loop and its cancel handle, and the traits a host implements
/// to give the component a canvas, a renderer and a frame clock.

pub mod camera;
pub mod component;
pub mod config;
pub mod error;
pub mod geometry;
pub mod render_loop;
pub mod renderer;
pub mod scene;
pub mod scheduler;
pub mod texture;
pub mod transform;

// Re-export commonly used types
pub use camera::{aspect_ratio, PerspectiveCamera};
pub use component::{CubeComponent, Host, Lifecycle};
pub use config::CubeConfig;
pub use error::{Error, Result};
pub use geometry::{Geometry, Triangle, Vertex};
pub use render_loop::{LoopHandle, Stage};
pub use renderer::{drawing_buffer_size, CanvasSurface, Renderer};
pub use scene::{assemble_scene, Color, Mesh, Scene};
pub use scheduler::{FrameCallback, FrameQueue, FrameRequestId, FrameScheduler};
pub use texture::{BasicMaterial, Texture, TextureImage, TextureState};
pub use transform::{Euler, Transform};
