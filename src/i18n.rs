use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Vietnamese,
    English,
}

impl Language {
    /// Code stored alongside feedback rows ("vi" / "en").
    pub fn code(self) -> &'static str {
        match self {
            Language::Vietnamese => "vi",
            Language::English => "en",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::Vietnamese => Language::English,
            Language::English => Language::Vietnamese,
        }
    }

    pub fn texts(self) -> &'static Texts {
        match self {
            Language::Vietnamese => &VI,
            Language::English => &EN,
        }
    }

    /// Picks the Vietnamese or English variant of a bilingual field.
    pub fn pick<'a>(self, vi: &'a str, en: &'a str) -> &'a str {
        match self {
            Language::Vietnamese => vi,
            Language::English => en,
        }
    }

    pub fn from_button(text: &str) -> Option<Self> {
        match text {
            VI_BUTTON => Some(Language::Vietnamese),
            EN_BUTTON => Some(Language::English),
            _ => None,
        }
    }
}

pub const VI_BUTTON: &str = "🇻🇳 Tiếng Việt";
pub const EN_BUTTON: &str = "🇬🇧 English";

/// UI strings of the bot. Course content itself is bilingual in the data files.
pub struct Texts {
    pub greeting: &'static str,
    pub choose_language: &'static str,
    pub menu_prompt: &'static str,
    pub menu_articles: &'static str,
    pub menu_quiz: &'static str,
    pub menu_chat: &'static str,
    pub menu_feedback: &'static str,
    pub menu_language: &'static str,
    pub menu_about: &'static str,
    pub back_to_menu: &'static str,
    pub choose_option: &'static str,

    pub reading_choose_chapter: &'static str,
    pub reading_choose_article: &'static str,
    pub reading_no_articles: &'static str,
    pub article_not_found: &'static str,
    pub article_by: &'static str,
    pub search_results: &'static str,
    pub search_empty: &'static str,

    pub quiz_choose_chapter: &'static str,
    pub quiz_choose_quiz: &'static str,
    pub quiz_no_quizzes: &'static str,
    pub quiz_count: &'static str,
    pub quiz_question: &'static str,
    pub quiz_of: &'static str,
    pub quiz_answered: &'static str,
    pub quiz_previous: &'static str,
    pub quiz_next: &'static str,
    pub quiz_submit: &'static str,
    pub quiz_incomplete: &'static str,
    pub quiz_back_to_chapters: &'static str,
    pub quiz_back_to_quizzes: &'static str,
    pub quiz_try_again: &'static str,
    pub quiz_score: &'static str,
    pub quiz_passed: &'static str,
    pub quiz_failed: &'static str,
    pub quiz_your_answer: &'static str,
    pub quiz_correct_answer: &'static str,
    pub quiz_explanation: &'static str,

    pub chat_intro: &'static str,
    pub chat_busy: &'static str,
    pub chat_error: &'static str,
    pub chat_cleared: &'static str,
    pub chat_copy: &'static str,
    pub chat_copied: &'static str,
    pub chat_usage: &'static str,

    pub about_title: &'static str,
    pub about_team: &'static str,
    pub about_no_team: &'static str,
    pub about_ai_title: &'static str,
    pub about_ai_description: &'static str,
    pub about_model: &'static str,
    pub about_tools: &'static str,

    pub feedback_rating: &'static str,
    pub feedback_text: &'static str,
    pub feedback_email: &'static str,
    pub feedback_skip: &'static str,
    pub feedback_invalid_rating: &'static str,
    pub feedback_invalid_email: &'static str,
    pub feedback_empty: &'static str,
    pub feedback_thanks: &'static str,
    pub feedback_not_configured: &'static str,
    pub feedback_error: &'static str,
    pub rating_labels: [&'static str; 5],
}

static VI: Texts = Texts {
    greeting: "Xin chào! Mình là trợ lý học tập HCM202 (Tư tưởng Hồ Chí Minh). Hãy chọn ngôn ngữ.\nHello! Please choose your language.",
    choose_language: "Vui lòng chọn một ngôn ngữ / Please choose a language",
    menu_prompt: "Bạn muốn làm gì?",
    menu_articles: "📚 Bài viết",
    menu_quiz: "📝 Kiểm tra",
    menu_chat: "💬 Hỏi AI",
    menu_feedback: "⭐ Góp ý",
    menu_language: "🌐 English",
    menu_about: "ℹ️ Giới thiệu",
    back_to_menu: "🏠 Menu",
    choose_option: "Vui lòng chọn một trong các lựa chọn",

    reading_choose_chapter: "Chọn chương để xem bài viết",
    reading_choose_article: "Chọn bài viết",
    reading_no_articles: "Chương này chưa có bài viết",
    article_not_found: "Không tìm thấy bài viết",
    article_by: "Tác giả",
    search_results: "Kết quả tìm kiếm",
    search_empty: "Không có bài viết phù hợp",

    quiz_choose_chapter: "Kiểm tra kiến thức của bạn về tư tưởng Hồ Chí Minh. Chọn chương:",
    quiz_choose_quiz: "Chọn bài kiểm tra để bắt đầu",
    quiz_no_quizzes: "Chương này chưa có bài kiểm tra",
    quiz_count: "câu hỏi",
    quiz_question: "Câu hỏi",
    quiz_of: "trên",
    quiz_answered: "Đã trả lời",
    quiz_previous: "⬅️ Câu trước",
    quiz_next: "Câu tiếp ➡️",
    quiz_submit: "✅ Nộp bài",
    quiz_incomplete: "Bạn cần trả lời tất cả câu hỏi trước khi nộp bài",
    quiz_back_to_chapters: "↩️ Về danh sách chương",
    quiz_back_to_quizzes: "↩️ Về danh sách bài kiểm tra",
    quiz_try_again: "🔁 Làm lại",
    quiz_score: "Điểm",
    quiz_passed: "🎉 Chúc mừng! Bạn đã vượt qua bài kiểm tra.",
    quiz_failed: "Bạn chưa đạt. Hãy ôn lại và thử lần nữa nhé!",
    quiz_your_answer: "Bạn chọn",
    quiz_correct_answer: "Đáp án đúng",
    quiz_explanation: "Giải thích",

    chat_intro: "Hãy đặt câu hỏi về nội dung Chương III. Gõ /clear để xoá cuộc trò chuyện.",
    chat_busy: "Mình đang trả lời câu hỏi trước, bạn đợi chút nhé…",
    chat_error: "Xin lỗi, hiện không thể kết nối tới trợ lý AI. Vui lòng thử lại sau.",
    chat_cleared: "Đã xoá cuộc trò chuyện",
    chat_copy: "📋 Sao chép",
    chat_copied: "Đã sao chép",
    chat_usage: "Token",

    about_title: "Giới thiệu dự án HCM202",
    about_team: "Nhóm thực hiện",
    about_no_team: "Chưa có thông tin về nhóm thực hiện.",
    about_ai_title: "Trợ lý AI",
    about_ai_description: "Trợ lý chỉ trả lời các câu hỏi về Tư tưởng Hồ Chí Minh trong phạm vi học phần HCM202, dựa trên nội dung Chương III. Câu hỏi ngoài phạm vi sẽ được hướng về nội dung môn học.",
    about_model: "Mô hình",
    about_tools: "Công cụ",

    feedback_rating: "Bạn đánh giá trang học tập thế nào? (1-5 sao)",
    feedback_text: "Hãy chia sẻ góp ý của bạn",
    feedback_email: "Email của bạn (không bắt buộc)",
    feedback_skip: "Bỏ qua",
    feedback_invalid_rating: "Vui lòng chọn từ 1 đến 5 sao",
    feedback_invalid_email: "Email không hợp lệ, vui lòng nhập lại hoặc bỏ qua",
    feedback_empty: "Góp ý không được để trống",
    feedback_thanks: "Cảm ơn bạn đã gửi góp ý!",
    feedback_not_configured: "Hệ thống phản hồi đang được cấu hình. Vui lòng thử lại sau.",
    feedback_error: "Không thể gửi phản hồi. Vui lòng thử lại sau.",
    rating_labels: [
        "Rất không hài lòng",
        "Không hài lòng",
        "Trung bình",
        "Hài lòng",
        "Rất hài lòng",
    ],
};

static EN: Texts = Texts {
    greeting: "Xin chào! Hello! I am the HCM202 (Ho Chi Minh Thought) study assistant. Please choose your language.",
    choose_language: "Vui lòng chọn một ngôn ngữ / Please choose a language",
    menu_prompt: "What would you like to do?",
    menu_articles: "📚 Articles",
    menu_quiz: "📝 Quiz",
    menu_chat: "💬 Ask AI",
    menu_feedback: "⭐ Feedback",
    menu_language: "🌐 Tiếng Việt",
    menu_about: "ℹ️ About",
    back_to_menu: "🏠 Menu",
    choose_option: "Please pick one of the options",

    reading_choose_chapter: "Choose a chapter to browse its articles",
    reading_choose_article: "Choose an article",
    reading_no_articles: "This chapter has no articles yet",
    article_not_found: "Article not found",
    article_by: "By",
    search_results: "Search results",
    search_empty: "No matching articles",

    quiz_choose_chapter: "Test your knowledge of Ho Chi Minh Thought. Choose a chapter:",
    quiz_choose_quiz: "Choose a quiz to start",
    quiz_no_quizzes: "This chapter has no quizzes yet",
    quiz_count: "questions",
    quiz_question: "Question",
    quiz_of: "of",
    quiz_answered: "Answered",
    quiz_previous: "⬅️ Previous",
    quiz_next: "Next ➡️",
    quiz_submit: "✅ Submit",
    quiz_incomplete: "Answer every question before submitting",
    quiz_back_to_chapters: "↩️ Back to chapters",
    quiz_back_to_quizzes: "↩️ Back to quizzes",
    quiz_try_again: "🔁 Try again",
    quiz_score: "Score",
    quiz_passed: "🎉 Congratulations! You passed.",
    quiz_failed: "Not passed yet. Review the chapter and try again!",
    quiz_your_answer: "Your answer",
    quiz_correct_answer: "Correct answer",
    quiz_explanation: "Explanation",

    chat_intro: "Ask anything about the Chapter III material. Send /clear to wipe the conversation.",
    chat_busy: "Still answering your previous question, please wait…",
    chat_error: "Sorry, the AI assistant is unavailable right now. Please try again later.",
    chat_cleared: "Conversation cleared",
    chat_copy: "📋 Copy",
    chat_copied: "Copied",
    chat_usage: "Tokens",

    about_title: "About the HCM202 project",
    about_team: "Project team",
    about_no_team: "No team information yet.",
    about_ai_title: "AI assistant",
    about_ai_description: "The assistant only answers questions on Ho Chi Minh Thought within the HCM202 course, grounded in the Chapter III material. Off-topic questions are steered back to the course.",
    about_model: "Model",
    about_tools: "Tools",

    feedback_rating: "How would you rate the course site? (1-5 stars)",
    feedback_text: "Please share your feedback",
    feedback_email: "Your email (optional)",
    feedback_skip: "Skip",
    feedback_invalid_rating: "Please choose between 1 and 5 stars",
    feedback_invalid_email: "That email looks invalid, type it again or skip",
    feedback_empty: "Feedback cannot be empty",
    feedback_thanks: "Thank you for your feedback!",
    feedback_not_configured: "The feedback system is being configured. Please try again later.",
    feedback_error: "Could not send your feedback. Please try again later.",
    rating_labels: [
        "Very dissatisfied",
        "Dissatisfied",
        "Neutral",
        "Satisfied",
        "Very satisfied",
    ],
};
