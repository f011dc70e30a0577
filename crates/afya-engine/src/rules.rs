//! Keyword-scored rule engine.
//!
//! Each category carries a keyword list and a bilingual response pool. A
//! message is scored per category as the fraction of that category's
//! keywords it contains; the best-scoring category above a small threshold
//! wins, otherwise the general fallback answers. Confidence reflects the
//! keyword fraction, floored so a matched category never reads as a guess.

use rand::seq::IndexedRandom;
use tracing::debug;

use crate::generator::ResponseGenerator;
use crate::types::{Category, GeneratedResponse, Language};

/// Minimum keyword fraction for a category to win.
const MATCH_THRESHOLD: f64 = 0.1;

/// Confidence floor for a matched category.
const MATCH_CONFIDENCE_FLOOR: f64 = 0.8;

/// Confidence reported for the general fallback.
const FALLBACK_CONFIDENCE: f64 = 0.5;

struct Rule {
    category: Category,
    keywords: &'static [&'static str],
    responses_en: &'static [&'static str],
    responses_ar: &'static [&'static str],
}

static RULES: &[Rule] = &[
    Rule {
        category: Category::Eligibility,
        keywords: &[
            "eligible",
            "eligibility",
            "coverage",
            "covered",
            "insurance",
            "policy",
            "benefits",
        ],
        responses_en: &[
            "Your policy is active and the requested services fall within its covered benefits. Certain specialist procedures may still need prior authorization before scheduling.",
            "Coverage check complete: preventive care, diagnostics, and specialist consultations are included under your current plan. Review the benefit schedule for per-visit limits.",
            "Your membership record shows active coverage with no outstanding premium issues. Confirm procedure-level coverage with your provider before booking.",
        ],
        responses_ar: &[
            "وثيقة التأمين الخاصة بك سارية والخدمات المطلوبة مشمولة ضمن المنافع المغطاة. قد تتطلب بعض الإجراءات التخصصية موافقة مسبقة قبل الحجز.",
            "اكتمل التحقق من التغطية: الرعاية الوقائية والفحوصات واستشارات الأخصائيين مشمولة ضمن خطتك الحالية.",
            "سجل العضوية يظهر تغطية فعالة بدون مستحقات متأخرة. يرجى التأكد من تغطية الإجراء المحدد مع مقدم الخدمة قبل الحجز.",
        ],
    },
    Rule {
        category: Category::Claims,
        keywords: &[
            "claim",
            "claims",
            "billing",
            "payment",
            "reimbursement",
            "submit",
            "invoice",
        ],
        responses_en: &[
            "Your claim has been received and passed initial validation. Typical processing time is 2-3 business days; you will be notified when the status changes.",
            "The submission looks complete: no missing documentation was detected. It has been queued for adjudication with the payer.",
            "Claim accepted for processing. Reimbursement, once approved, is settled to the account on file within five business days.",
        ],
        responses_ar: &[
            "تم استلام مطالبتك واجتازت التحقق الأولي. مدة المعالجة المعتادة من يومين إلى ثلاثة أيام عمل وسيتم إشعارك عند تغير الحالة.",
            "الطلب مكتمل ولم يتم رصد أي مستندات ناقصة. تمت إحالته إلى شركة التأمين للتدقيق.",
            "تم قبول المطالبة للمعالجة. يتم تحويل المبلغ المعتمد إلى الحساب المسجل خلال خمسة أيام عمل.",
        ],
    },
    Rule {
        category: Category::PreAuthorization,
        keywords: &[
            "authorization",
            "approval",
            "pre-auth",
            "prior",
            "permission",
            "procedure",
        ],
        responses_en: &[
            "This procedure requires prior authorization under your plan. Submit the supporting clinical documentation and expect a decision within 24-48 hours.",
            "A prior-authorization request has been opened. Approval timelines for comparable cases run one to two business days.",
            "The required documentation checklist for this authorization is ready. Complete submissions are usually decided within two business days.",
        ],
        responses_ar: &[
            "يتطلب هذا الإجراء موافقة مسبقة بموجب خطتك. يرجى إرفاق المستندات الطبية الداعمة وتوقع قرارا خلال 24 إلى 48 ساعة.",
            "تم فتح طلب الموافقة المسبقة. تستغرق الموافقة في الحالات المماثلة من يوم إلى يومي عمل.",
            "قائمة المستندات المطلوبة للموافقة جاهزة. الطلبات المكتملة يبت فيها عادة خلال يومي عمل.",
        ],
    },
    Rule {
        category: Category::Platform,
        keywords: &[
            "nphies",
            "integration",
            "system",
            "connection",
            "exchange",
            "platform",
        ],
        responses_en: &[
            "The national health-insurance exchange link is up: transactions are flowing in real time and compliance checks are passing.",
            "Platform connectivity is healthy. Your provider's integration with the exchange processed its recent transactions without errors.",
            "All exchange endpoints are reachable and synchronization is current. No pending outages are scheduled.",
        ],
        responses_ar: &[
            "الربط مع منصة التأمين الصحي الوطنية يعمل: المعاملات تتم في الوقت الفعلي وفحوصات الالتزام ناجحة.",
            "حالة الاتصال بالمنصة سليمة. تكامل مقدم الخدمة مع المنصة عالج المعاملات الأخيرة دون أخطاء.",
            "جميع نقاط الربط متاحة والمزامنة محدثة. لا توجد أعطال مجدولة حاليا.",
        ],
    },
    Rule {
        category: Category::Emergency,
        keywords: &["emergency", "urgent", "critical", "immediate", "asap"],
        responses_en: &[
            "Emergency handling engaged: this case has been escalated to the priority queue and eligibility checks are bypassed for immediate care.",
            "Urgent request noted. Emergency services are covered without prior authorization; proceed with care and file documentation afterwards.",
        ],
        responses_ar: &[
            "تم تفعيل مسار الطوارئ: أحيلت الحالة إلى قائمة الأولوية ويتم تجاوز فحص الأهلية للرعاية الفورية.",
            "تم تسجيل الطلب العاجل. خدمات الطوارئ مغطاة دون موافقة مسبقة؛ يمكن تقديم المستندات لاحقا.",
        ],
    },
];

static FALLBACK_EN: &[&str] = &[
    "I can help with eligibility, claims, prior authorization, and exchange-platform questions. Tell me more about what you need.",
    "Ask me about coverage checks, claim status, or prior-authorization requirements and I will walk you through the next steps.",
];

static FALLBACK_AR: &[&str] = &[
    "يمكنني المساعدة في أسئلة الأهلية والمطالبات والموافقات المسبقة ومنصة التبادل. أخبرني بما تحتاجه.",
    "اسألني عن التحقق من التغطية أو حالة المطالبة أو متطلبات الموافقة المسبقة وسأرشدك إلى الخطوات التالية.",
];

/// Keyword-scored canned response generator.
#[derive(Default)]
pub struct RuleEngine;

impl RuleEngine {
    /// Create the engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn score(message: &str, rule: &Rule) -> f64 {
        let matched = rule
            .keywords
            .iter()
            .filter(|k| message.contains(*k))
            .count();
        #[allow(clippy::cast_precision_loss)]
        {
            matched as f64 / rule.keywords.len() as f64
        }
    }
}

impl ResponseGenerator for RuleEngine {
    fn generate(
        &self,
        message: &str,
        language: Language,
        context: Option<&str>,
    ) -> GeneratedResponse {
        let lowered = message.to_lowercase();

        let best = RULES
            .iter()
            .map(|rule| (rule, Self::score(&lowered, rule)))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        let mut rng = rand::rng();
        match best {
            Some((rule, score)) if score > MATCH_THRESHOLD => {
                let pool = match language {
                    Language::En => rule.responses_en,
                    Language::Ar => rule.responses_ar,
                };
                let text = pool.choose(&mut rng).copied().unwrap_or(pool[0]);
                let confidence =
                    (MATCH_CONFIDENCE_FLOOR + (1.0 - MATCH_CONFIDENCE_FLOOR) * score).min(0.99);
                debug!(
                    category = rule.category.as_str(),
                    score, context, "matched rule category"
                );
                GeneratedResponse {
                    message: text.to_owned(),
                    confidence,
                    category: rule.category,
                }
            }
            _ => {
                let pool = match language {
                    Language::En => FALLBACK_EN,
                    Language::Ar => FALLBACK_AR,
                };
                let text = pool.choose(&mut rng).copied().unwrap_or(pool[0]);
                debug!(context, "no category matched, using general fallback");
                GeneratedResponse {
                    message: text.to_owned(),
                    confidence: FALLBACK_CONFIDENCE,
                    category: Category::General,
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
