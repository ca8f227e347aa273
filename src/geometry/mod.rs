pub mod curve;
pub mod spine;
pub mod surface;

pub use curve::{Arc, Curve, CurveDomain, Polyline};
pub use spine::ConformalSpine;
pub use surface::{
    FeaSurface, GridSurface, ParamPatch, PlanarPatch, Plane, RevolvedSurface, Surface,
    SurfaceDomain, SurfaceRole, SurfaceShape,
};
