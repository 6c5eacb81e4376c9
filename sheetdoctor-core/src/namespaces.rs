//! Namespace URIs and well-known part names

/// `[Content_Types].xml` namespace
pub const CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Namespace of `.rels` parts
pub const PACKAGE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

/// Namespace of `r:id` attributes inside office documents
pub const OFFICE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Strict-conformance variant of [`OFFICE_RELATIONSHIPS`]
pub const OFFICE_RELATIONSHIPS_STRICT: &str =
    "http://purl.oclc.org/ooxml/officeDocument/relationships";

/// SpreadsheetML main namespace
pub const SPREADSHEETML: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Strict-conformance variant of [`SPREADSHEETML`]
pub const SPREADSHEETML_STRICT: &str = "http://purl.oclc.org/ooxml/spreadsheetml/main";

pub const REL_TYPE_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_TYPE_OFFICE_DOCUMENT_STRICT: &str =
    "http://purl.oclc.org/ooxml/officeDocument/relationships/officeDocument";

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const ROOT_RELS_PART: &str = "_rels/.rels";
pub const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";
