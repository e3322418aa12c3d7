#![warn(clippy::uninlined_format_args)]

pub mod command_parser;
pub mod png_renderer;
pub mod wire;

pub use command_parser::CommandReceiptParser;
pub use png_renderer::{PngSummaryRenderer, svg_to_png};
pub use wire::{
    ItemAssignmentDto, ItemDto, ParseResponseDto, PersonAssignmentDto, PersonSplitDto,
    SplitRequestDto, parse_service_response,
};
