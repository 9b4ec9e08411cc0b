//! Element names of the XML-RPC document grammar.

pub const VALUE: &str = "value";
pub const INT: &str = "int";
pub const I4: &str = "i4";
pub const BOOLEAN: &str = "boolean";
pub const DOUBLE: &str = "double";
pub const STRING: &str = "string";
pub const DATETIME: &str = "dateTime.iso8601";
pub const BASE64: &str = "base64";
pub const ARRAY: &str = "array";
pub const ARRAY_DATA: &str = "data";
pub const STRUCT: &str = "struct";
pub const MEMBER: &str = "member";
pub const MEMBER_NAME: &str = "name";

pub const METHOD_CALL: &str = "methodCall";
pub const METHOD_NAME: &str = "methodName";
pub const METHOD_RESPONSE: &str = "methodResponse";
pub const PARAMS: &str = "params";
pub const PARAM: &str = "param";
pub const FAULT: &str = "fault";

pub const FAULT_CODE: &str = "faultCode";
pub const FAULT_STRING: &str = "faultString";

/// Declaration prepended to every rendered document.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\" ?>";
