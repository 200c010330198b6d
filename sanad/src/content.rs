//! Static quiz content
//!
//! Immutable college/test/question records. The quiz engine reads these and
//! never mutates them; progress lives elsewhere.

pub const INITIAL_HEARTS: i32 = 5;
pub const XP_PER_CORRECT: u32 = 10;
/// 80% to pass
pub const PASS_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    pub explanation: String,
}

#[derive(Debug, Clone)]
pub struct Test {
    pub id: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone)]
pub struct College {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub tests: Vec<Test>,
}

pub fn find_college<'a>(colleges: &'a [College], id: &str) -> Option<&'a College> {
    colleges.iter().find(|c| c.id == id)
}

pub fn colleges() -> Vec<College> {
    vec![
        college("medicine", "كلية الطب", "🏥", "الطب"),
        college(
            "applied-science",
            "كلية العلوم التطبيقية",
            "🔬",
            "العلوم التطبيقية",
        ),
        college("nursing", "كلية التمريض", "🩺", "التمريض"),
        college("business", "كلية الأعمال", "📊", "إدارة الأعمال"),
    ]
}

fn college(id: &str, name: &str, icon: &str, short_name: &str) -> College {
    College {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
        tests: generate_tests(id, short_name),
    }
}

fn question(id: &str, text: &str, options: [&str; 2], explanation: &str) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        // The curated bank keeps the right answer first; shuffling is a
        // presentation concern
        correct_answer_index: 0,
        explanation: explanation.to_string(),
    }
}

/// The four level-tests every college offers, sharing one curated question
/// bank with the college name woven into the opener
fn generate_tests(college_id: &str, college_name: &str) -> Vec<Test> {
    vec![
        Test {
            id: format!("{college_id}-t1"),
            title: "المستوى الأول: الأساسيات".to_string(),
            description: "مدخل شامل للمفاهيم الأساسية في هذا التخصص.".to_string(),
            questions: vec![
                question(
                    "q1",
                    &format!("ما هو أول شيء يتعلمه طالب في {college_name}؟"),
                    ["الأخلاقيات والأسس", "التطبيقات المعقدة"],
                    "دائماً نبدأ بالأسس والأخلاقيات المهنية.",
                ),
                question(
                    "q2",
                    "ما أهمية البحث العلمي؟",
                    ["تطوير المعرفة", "تضييع الوقت"],
                    "البحث العلمي هو أساس التطور.",
                ),
                question(
                    "q3",
                    "كيف نحافظ على دقة المعلومات؟",
                    ["بالتوثيق والمراجعة", "بالتخمين"],
                    "الدقة تأتي من المراجعة المستمرة.",
                ),
                question(
                    "q4",
                    "ما هو العمل الجماعي؟",
                    ["تعاون الجميع لتحقيق هدف", "عمل كل شخص بمفرده"],
                    "العمل الجماعي سر النجاح في هذا المجال.",
                ),
                question(
                    "q5",
                    "متى نستخدم التقنية؟",
                    ["لتسهيل المهام وزيادة الدقة", "لاستبدال الإنسان تماماً"],
                    "التقنية وسيلة مساعدة وليست بديلاً عن العقل.",
                ),
            ],
        },
        Test {
            id: format!("{college_id}-t2"),
            title: "المستوى الثاني: التخصص العميق".to_string(),
            description: "الغوص في تفاصيل المواد التخصصية.".to_string(),
            questions: vec![
                question(
                    "q6",
                    "ما هي أهم مهارة تخصصية؟",
                    ["التحليل النقدي", "الحفظ فقط"],
                    "التحليل النقدي يساعدك على فهم أعمق.",
                ),
                question(
                    "q7",
                    "كيف نتعامل مع المشكلات المعقدة؟",
                    ["بتقسيمها لأجزاء صغيرة", "بتجاهلها"],
                    "التفكيك هو الحل الأمثل للمشاكل الكبيرة.",
                ),
                question(
                    "q8",
                    "ما هو دور الإبداع؟",
                    ["ابتكار حلول جديدة", "تكرار القديم"],
                    "الإبداع يفتح آفاقاً جديدة للتطور.",
                ),
                question(
                    "q9",
                    "أهمية الوقت في العمل؟",
                    ["إدارة المهام بكفاءة", "لا يهم الوقت"],
                    "الوقت مورد ثمين يجب إدارته بحذر.",
                ),
                question(
                    "q10",
                    "كيف نطور المهارات؟",
                    ["بالتدريب المستمر", "بالانتظار"],
                    "التدريب هو مفتاح الإتقان.",
                ),
            ],
        },
        Test {
            id: format!("{college_id}-t3"),
            title: "المستوى الثالث: التطبيق العملي".to_string(),
            description: "تطبيقات من واقع الحياة المهنية.".to_string(),
            questions: vec![
                question(
                    "q11",
                    "ماذا نفعل عند الفشل في التجربة؟",
                    ["نتعلم من الخطأ ونعيد المحاولة", "نتوقف تماماً"],
                    "الفشل هو خطوة نحو النجاح إذا تعلمنا منه.",
                ),
                question(
                    "q12",
                    "أهمية الأمان في العمل؟",
                    ["أولوية قصوى", "شيء ثانوي"],
                    "السلامة تأتي أولاً في كل التطبيقات.",
                ),
                question(
                    "q13",
                    "كيف نتواصل مع الفريق؟",
                    ["بوضوح وشفافية", "بغموض"],
                    "التواصل الواضح يمنع الأخطاء.",
                ),
                question(
                    "q14",
                    "ما هو دور الملاحظة؟",
                    ["جمع البيانات بدقة", "النظر السطحي"],
                    "الملاحظة الدقيقة أساس العلم والتطبيق.",
                ),
                question(
                    "q15",
                    "كيف نحسن النتائج؟",
                    ["بالتحليل والتقييم", "بتركها للصدفة"],
                    "التقييم المستمر يؤدي للتحسين المستمر.",
                ),
            ],
        },
        Test {
            id: format!("{college_id}-t4"),
            title: "المستوى الرابع: التميز والاحتراف".to_string(),
            description: "أعلى مستويات المعرفة والقدرة في المجال.".to_string(),
            questions: vec![
                question(
                    "q16",
                    "ما هو معيار الاحتراف؟",
                    ["الإتقان والالتزام", "السرعة فقط"],
                    "الاحتراف هو مزيج من العلم والخلق.",
                ),
                question(
                    "q17",
                    "كيف نقود الآخرين؟",
                    ["بالقدوة والتحفيز", "بالأوامر الصارمة"],
                    "القيادة هي فن التأثير في الآخرين.",
                ),
                question(
                    "q18",
                    "ما هي الرؤية المستقبلية؟",
                    ["التخطيط للمدى البعيد", "العيش ليومك فقط"],
                    "الرؤية توجه مسارك المهني للقمة.",
                ),
                question(
                    "q19",
                    "أهمية التطوير الذاتي؟",
                    ["تعلم مستمر مدى الحياة", "التوقف بعد التخرج"],
                    "العالم يتغير ويجب أن نتحرك معه.",
                ),
                question(
                    "q20",
                    "ماذا يعني التميز؟",
                    ["تقديم أفضل من المتوقع", "تقديم الحد الأدنى"],
                    "التميز هو بصمتك الخاصة في عملك.",
                ),
            ],
        },
    ]
}
