// Constants shared by the OKL transforms

/// Attribute that requests loop tiling: `@tile(size, @blockAttrs, @innerAttrs)`
pub const TILE_ATTRIBUTE: &str = "tile";

/// Attribute listing the per-axis extents of a flattened array
pub const DIM_ATTRIBUTE: &str = "dim";

/// Attribute giving the axis permutation used when flattening
pub const DIM_ORDER_ATTRIBUTE: &str = "dimOrder";

/// Keyword argument of `@tile` toggling the generated bounds check
pub const TILE_CHECK_KWARG: &str = "check";

/// Prefix given to the cloned block iterator of a tiled loop
/// `i` becomes `_occa_tiled_i`
pub const TILED_ITERATOR_PREFIX: &str = "_occa_tiled_";

/// Tiled loops guard their inner body unless `check=false` is given
pub const DEFAULT_TILE_BOUNDS_CHECK: bool = true;

/// Context label prefixed to loop-shape messages raised while tiling
pub const TILE_CONTEXT: &str = "@tile";

/// Indentation used when printing statements
pub const INDENT: &str = "  ";
