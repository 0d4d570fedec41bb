//! Specialized segment payloads for calls to remote resources.
//!
//! A variant never changes lifecycle or tree behavior. It only contributes
//! extra top-level fields (`namespace`, `http`, `sql`, `aws`) that are merged
//! into the segment's serialization.

use serde::Serialize;

/// The namespace reported for segments that describe downstream calls.
pub const REMOTE_NAMESPACE: &str = "remote";

/// Which kind of work a segment describes.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SegmentKind {
    /// A plain unit of work.
    #[default]
    Generic,
    /// An outgoing HTTP call.
    Http(HttpData),
    /// A database query.
    Sql(SqlData),
}

impl SegmentKind {
    /// Returns `true` for variants that describe a remote call.
    pub fn is_remote(&self) -> bool {
        !matches!(self, SegmentKind::Generic)
    }
}

/// Request and response details of an outgoing HTTP call.
///
/// ## Example
///
/// ```rust
/// use xray_segments::{HttpData, Segment};
///
/// let mut segment = Segment::http(
///     HttpData::new()
///         .with_url("http://example.com/")
///         .with_method("GET"),
/// );
/// segment.begin();
///
/// // ... perform the request ...
///
/// if let Some(http) = segment.http_mut() {
///     http.set_response_code(200).set_content_length(300);
/// }
/// segment.end();
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpData {
    url: Option<String>,
    method: Option<String>,
    traced: Option<bool>,
    response_code: Option<u16>,
    content_length: Option<u64>,
    aws_account_id: Option<String>,
}

impl HttpData {
    /// Creates an empty HTTP payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the request method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Marks whether the downstream service was itself instrumented.
    #[must_use]
    pub fn with_traced(mut self, traced: bool) -> Self {
        self.traced = Some(traced);
        self
    }

    /// Sets the response status code.
    #[must_use]
    pub fn with_response_code(mut self, status: u16) -> Self {
        self.response_code = Some(status);
        self
    }

    /// Sets the response body length.
    #[must_use]
    pub fn with_content_length(mut self, length: u64) -> Self {
        self.content_length = Some(length);
        self
    }

    /// Sets the account id of the called service.
    #[must_use]
    pub fn with_aws_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.aws_account_id = Some(account_id.into());
        self
    }

    /// Sets the request URL in place.
    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the request method in place.
    pub fn set_method(&mut self, method: impl Into<String>) -> &mut Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the traced marker in place.
    pub fn set_traced(&mut self, traced: bool) -> &mut Self {
        self.traced = Some(traced);
        self
    }

    /// Sets the response status code in place.
    pub fn set_response_code(&mut self, status: u16) -> &mut Self {
        self.response_code = Some(status);
        self
    }

    /// Sets the response body length in place.
    pub fn set_content_length(&mut self, length: u64) -> &mut Self {
        self.content_length = Some(length);
        self
    }

    /// Sets the called service's account id in place.
    pub fn set_aws_account_id(&mut self, account_id: impl Into<String>) -> &mut Self {
        self.aws_account_id = Some(account_id.into());
        self
    }

    /// Returns the request URL.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns the request method.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Returns the traced marker, if it was set.
    pub fn traced(&self) -> Option<bool> {
        self.traced
    }

    /// Returns the response status code.
    pub fn response_code(&self) -> Option<u16> {
        self.response_code
    }

    /// Returns the response body length.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Returns the called service's account id.
    pub fn aws_account_id(&self) -> Option<&str> {
        self.aws_account_id.as_deref()
    }
}

/// Details of a database query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SqlData {
    #[serde(skip_serializing_if = "is_blank")]
    url: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    preparation: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    database_type: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    database_version: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    driver_version: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    user: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    sanitized_query: Option<String>,
}

impl SqlData {
    /// Creates an empty SQL payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connection URL (without credentials).
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets how the statement was prepared (`"call"` or `"statement"`).
    #[must_use]
    pub fn with_preparation(mut self, preparation: impl Into<String>) -> Self {
        self.preparation = Some(preparation.into());
        self
    }

    /// Sets the database engine name.
    #[must_use]
    pub fn with_database_type(mut self, database_type: impl Into<String>) -> Self {
        self.database_type = Some(database_type.into());
        self
    }

    /// Sets the database engine version.
    #[must_use]
    pub fn with_database_version(mut self, version: impl Into<String>) -> Self {
        self.database_version = Some(version.into());
        self
    }

    /// Sets the client driver version.
    #[must_use]
    pub fn with_driver_version(mut self, version: impl Into<String>) -> Self {
        self.driver_version = Some(version.into());
        self
    }

    /// Sets the database user.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the query text with user-provided values removed.
    #[must_use]
    pub fn with_sanitized_query(mut self, query: impl Into<String>) -> Self {
        self.sanitized_query = Some(query.into());
        self
    }

    /// Returns the connection URL.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns the database engine name.
    pub fn database_type(&self) -> Option<&str> {
        self.database_type.as_deref()
    }

    /// Returns the sanitized query.
    pub fn sanitized_query(&self) -> Option<&str> {
        self.sanitized_query.as_deref()
    }

    fn is_empty(&self) -> bool {
        [
            &self.url,
            &self.preparation,
            &self.database_type,
            &self.database_version,
            &self.driver_version,
            &self.user,
            &self.sanitized_query,
        ]
        .into_iter()
        .all(is_blank)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

// ============================================================================
// Serialized projection
// ============================================================================

/// Fields a variant adds at the top level of a segment document.
#[derive(Serialize, Default)]
pub(crate) struct VariantFields<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    http: Option<HttpDocument<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sql: Option<&'a SqlData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aws: Option<AwsDocument<'a>>,
}

#[derive(Serialize)]
struct HttpDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    request: Option<RequestDocument<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<ResponseDocument>,
}

#[derive(Serialize)]
struct RequestDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    traced: Option<bool>,
}

#[derive(Serialize)]
struct ResponseDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_length: Option<u64>,
}

#[derive(Serialize)]
struct AwsDocument<'a> {
    account_id: &'a str,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl<'a> VariantFields<'a> {
    pub(crate) fn project(kind: &'a SegmentKind) -> Self {
        let base = Self {
            namespace: kind.is_remote().then_some(REMOTE_NAMESPACE),
            ..Self::default()
        };
        match kind {
            SegmentKind::Generic => base,
            SegmentKind::Http(http) => Self {
                http: HttpDocument::project(http),
                aws: non_empty(&http.aws_account_id).map(|account_id| AwsDocument { account_id }),
                ..base
            },
            SegmentKind::Sql(sql) => Self {
                sql: (!sql.is_empty()).then_some(sql),
                ..base
            },
        }
    }
}

impl<'a> HttpDocument<'a> {
    fn project(http: &'a HttpData) -> Option<Self> {
        let request = RequestDocument {
            url: non_empty(&http.url),
            method: non_empty(&http.method),
            traced: http.traced,
        };
        let request = (request.url.is_some() || request.method.is_some() || request.traced.is_some())
            .then_some(request);

        let response = (http.response_code.is_some() || http.content_length.is_some()).then_some(
            ResponseDocument {
                status: http.response_code,
                content_length: http.content_length,
            },
        );

        (request.is_some() || response.is_some()).then_some(Self { request, response })
    }
}
