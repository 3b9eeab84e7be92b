//! Scheduler prompts
//!
//! Turns [`SchedulePreferences`] into the daily-schedule instruction. The
//! instruction names the exact output fields and category values declared
//! by [`crate::schema::schedule_schema`].

use crate::types::{Category, Intensity, Locale, SchedulePreferences};

/// Persona for the scheduler feature
pub fn scheduler_persona(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Bạn là chuyên gia quản lý thời gian, giúp sinh viên lập kế hoạch học tập hợp lý.",
        Locale::En => "You are a time-management expert who helps students plan balanced study days.",
    }
}

/// Builds the schedule instruction
///
/// Wake time, sleep time, subjects and intensity appear verbatim.
///
/// # Examples
///
/// ```
/// use smartstudy::prompts::scheduler_prompt::schedule_prompt;
/// use smartstudy::types::{Intensity, Locale, SchedulePreferences};
///
/// let prefs = SchedulePreferences {
///     wake_time: "06:30".to_string(),
///     sleep_time: "22:30".to_string(),
///     subjects: "Calculus".to_string(),
///     intensity: Intensity::Intense,
/// };
/// let prompt = schedule_prompt(&prefs, Locale::En);
/// assert!(prompt.contains("06:30"));
/// assert!(prompt.contains("Pomodoro"));
/// ```
pub fn schedule_prompt(prefs: &SchedulePreferences, locale: Locale) -> String {
    let categories = Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    match locale {
        Locale::Vi => {
            let pomodoro = if prefs.intensity == Intensity::Intense {
                "- Mức độ là 'intense': chia thời gian học thành các phiên Pomodoro (25 phút học, 5 phút nghỉ).\n"
            } else {
                "- Phân bổ thời gian Pomodoro nếu mức độ là 'intense'.\n"
            };
            format!(
                "Hãy tạo một lịch trình học tập hàng ngày cho sinh viên dựa trên thông tin sau:\n\
                 - Thức dậy: {wake}\n\
                 - Đi ngủ: {sleep}\n\
                 - Các môn cần học: {subjects}\n\
                 - Mức độ tập trung: {intensity}\n\
                 \n\
                 Yêu cầu:\n\
                 - Bao gồm thời gian nghỉ ngơi hợp lý.\n\
                 {pomodoro}\
                 - Đảm bảo cân bằng giữa học và sinh hoạt cá nhân.\n\
                 - Trả về một mảng JSON, mỗi phần tử có đúng các trường: time, activity, notes, category.\n\
                 - category chỉ nhận một trong các giá trị: {categories}.\n",
                wake = prefs.wake_time,
                sleep = prefs.sleep_time,
                subjects = prefs.subjects,
                intensity = prefs.intensity.as_str(),
                pomodoro = pomodoro,
                categories = categories,
            )
        }
        Locale::En => {
            let pomodoro = if prefs.intensity == Intensity::Intense {
                "- The intensity is 'intense': split study time into Pomodoro sessions (25 minutes of study, 5 minutes of rest).\n"
            } else {
                "- Use Pomodoro blocks if the intensity is 'intense'.\n"
            };
            format!(
                "Create a daily study schedule for a student based on the following:\n\
                 - Wake up: {wake}\n\
                 - Go to sleep: {sleep}\n\
                 - Subjects to study: {subjects}\n\
                 - Focus intensity: {intensity}\n\
                 \n\
                 Requirements:\n\
                 - Include reasonable breaks.\n\
                 {pomodoro}\
                 - Keep a balance between study and personal life.\n\
                 - Return a JSON array whose elements have exactly the fields: time, activity, notes, category.\n\
                 - category must be one of: {categories}.\n",
                wake = prefs.wake_time,
                sleep = prefs.sleep_time,
                subjects = prefs.subjects,
                intensity = prefs.intensity.as_str(),
                pomodoro = pomodoro,
                categories = categories,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn java_prefs() -> SchedulePreferences {
        SchedulePreferences {
            wake_time: "07:00".to_string(),
            sleep_time: "23:00".to_string(),
            subjects: "Java basics".to_string(),
            intensity: Intensity::Balanced,
        }
    }

    #[test]
    fn test_schedule_prompt_contains_all_values_verbatim() {
        for locale in [Locale::Vi, Locale::En] {
            let prompt = schedule_prompt(&java_prefs(), locale);
            assert!(prompt.contains("07:00"));
            assert!(prompt.contains("23:00"));
            assert!(prompt.contains("Java basics"));
            assert!(prompt.contains("balanced"));
        }
    }

    #[test]
    fn test_schedule_prompt_names_fields_and_categories() {
        let prompt = schedule_prompt(&java_prefs(), Locale::En);
        assert!(prompt.contains("time, activity, notes, category"));
        assert!(prompt.contains("study, break, personal, class"));
    }

    #[test]
    fn test_intense_schedule_requests_pomodoro_sessions() {
        let prefs = SchedulePreferences {
            intensity: Intensity::Intense,
            ..java_prefs()
        };
        let prompt = schedule_prompt(&prefs, Locale::En);
        assert!(prompt.contains("25 minutes"));
        assert!(!schedule_prompt(&java_prefs(), Locale::En).contains("25 minutes"));
    }
}
