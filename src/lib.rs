// Library exports for hexview

pub mod canvas;
pub mod command;
pub mod context_menu;
pub mod controller;
pub mod coords;
pub mod disassembly;
pub mod dropdown;
pub mod fltk_surface;
pub mod geometry;
pub mod handoff;
pub mod hex_grid;
pub mod input;
pub mod layout;
pub mod menu;
pub mod options;
pub mod options_dialog;
pub mod responsive_scrollbar;
pub mod source;
pub mod surface;
pub mod theme;
pub mod viewer;
pub mod widgets;
