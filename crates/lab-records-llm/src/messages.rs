//! Localized operator-facing messages.
//!
//! Narratives are requested in Arabic, so the failure explanations that stand
//! in for a narrative are Arabic too.

/// Analysis was requested while the workstation reported no connectivity.
pub const OFFLINE: &str =
    "لا يمكن إجراء التحليل الذكي في وضع عدم الاتصال (Offline). يرجى التحقق من الإنترنت.";

/// No API key is configured.
pub const MISSING_API_KEY: &str =
    "مفتاح الربط (API Key) غير موجود. لا يمكن استخدام ميزات الذكاء الاصطناعي.";

/// The model answered but produced no text.
pub const EMPTY_RESPONSE: &str = "لم يتم استلام تحليل من النظام الذكي.";

/// Network, quota, credential or any other request failure.
pub const REQUEST_FAILED: &str =
    "عذراً، حدث خطأ أثناء الاتصال. قد يكون السبب ضعف الإنترنت أو انتهاء صلاحية المفتاح.";
