//! Chatbot persona and greeting

use crate::types::Locale;

/// Persona for the chatbot feature
pub fn chat_persona(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Bạn là SmartStudy Bot, một trợ lý ảo chuyên hỗ trợ sinh viên FPT Polytechnic. Bạn giỏi về lập trình (Java, Python, Web), kỹ năng mềm và quản lý thời gian. Hãy trả lời thân thiện, ngắn gọn và hữu ích.",
        Locale::En => "You are SmartStudy Bot, a virtual assistant for FPT Polytechnic students. You are good at programming (Java, Python, Web), soft skills and time management. Answer in a friendly, concise and helpful way.",
    }
}

/// First assistant message shown when a chat view opens
pub fn chat_greeting(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Xin chào! Mình là SmartStudy AI. Bạn cần giúp đỡ gì về bài tập hay lập trình hôm nay?",
        Locale::En => "Hi! I'm SmartStudy AI. What can I help you with today, homework or programming?",
    }
}
