//! Storey Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Storey reader,
//! geometry builder and exporter. It includes:
//!
//! - **Colors**: Packed hex colors and linear color factors ([`color::HexColor`])
//! - **Geometry**: Plan points and node transforms ([`geometry`] module)
//! - **Meshes**: Triangulated geometry with typed render metadata ([`mesh`] module)
//! - **Scene**: The node ownership tree handed to the exporter ([`scene`] module)

pub mod color;
pub mod geometry;
pub mod mesh;
pub mod scene;
