/// Click picking, highlighting and strategy switching.
pub mod point_selection;
