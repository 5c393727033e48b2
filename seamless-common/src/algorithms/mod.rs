// private sub-module defined in other files
mod delaunay_triangulation;
mod is_clockwise_order;
mod poly_area;
mod poly_ops;
mod voronoi;

// exports identifiers from private sub-modules in the current module namespace
pub use self::delaunay_triangulation::EMPTY;
pub use self::delaunay_triangulation::{triangulate, Triangulation};
pub use self::is_clockwise_order::is_clockwise_order;
pub use self::poly_area::{polygon_area, signed_polygon_area};
pub use self::poly_ops::{point_in_poly, winding_number};
pub use self::voronoi::voronoi_cells;
