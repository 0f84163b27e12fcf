//! RTSP status vocabulary (RFC 2326 §7.1.1 and §11).
//!
//! RTSP reuses the HTTP status space and extends it with codes of its own
//! (250, 451-462, 551). The constants below cover the RTSP-specific codes;
//! [`status_text`] maps every code this server emits to its fixed text.

pub const LOW_STORAGE_SPACE: u16 = 250;

pub const PARAMETER_NOT_UNDERSTOOD: u16 = 451;
pub const CONFERENCE_NOT_FOUND: u16 = 452;
pub const NOT_ENOUGH_BANDWIDTH: u16 = 453;
pub const SESSION_NOT_FOUND: u16 = 454;
pub const METHOD_NOT_VALID_IN_THIS_STATE: u16 = 455;
pub const HEADER_FIELD_NOT_VALID: u16 = 456;
pub const INVALID_RANGE: u16 = 457;
pub const PARAMETER_IS_READ_ONLY: u16 = 458;
pub const AGGREGATE_OPERATION_NOT_ALLOWED: u16 = 459;
pub const ONLY_AGGREGATE_OPERATION_ALLOWED: u16 = 460;
pub const UNSUPPORTED_TRANSPORT: u16 = 461;
pub const DESTINATION_UNREACHABLE: u16 = 462;

pub const OPTION_NOT_SUPPORTED: u16 = 551;

/// Returns the fixed status text for `code`, or `""` when unknown.
pub fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        LOW_STORAGE_SPACE => "Low on Storage Space",
        PARAMETER_NOT_UNDERSTOOD => "Parameter Not Understood",
        CONFERENCE_NOT_FOUND => "Conference Not Found",
        NOT_ENOUGH_BANDWIDTH => "Not Enough Bandwidth",
        SESSION_NOT_FOUND => "Session Not Found",
        METHOD_NOT_VALID_IN_THIS_STATE => "Method Not Valid in This State",
        HEADER_FIELD_NOT_VALID => "Header Field Not Valid for Resource",
        INVALID_RANGE => "Invalid Range",
        PARAMETER_IS_READ_ONLY => "Parameter Is Read-Only",
        AGGREGATE_OPERATION_NOT_ALLOWED => "Aggregate Operation Not Allowed",
        ONLY_AGGREGATE_OPERATION_ALLOWED => "Only Aggregate Operation Allowed",
        UNSUPPORTED_TRANSPORT => "Unsupported Transport",
        DESTINATION_UNREACHABLE => "Destination Unreachable",
        OPTION_NOT_SUPPORTED => "Option not supported",
        _ => "",
    }
}
