const HEADACHE_REPLY: &str = "I'm sorry to hear about your headaches. They could be caused by several factors:\n\n1. Eye strain from screen glare or brightness\n2. Poor posture causing neck tension\n3. Dehydration during long work sessions\n\nWould you like recommendations for each of these potential causes?";

const NUTRITION_REPLY: &str = "For a balanced diet, focus on:\n\n- Fruits and vegetables\n- Whole grains\n- Lean proteins\n- Healthy fats\n- Limited processed foods\n\nWould you like more specific nutrition advice?";

const EXERCISE_REPLY: &str = "Regular exercise is crucial for health. Aim for:\n\n- 150 minutes of moderate activity weekly\n- Strength training 2-3 times per week\n- Flexibility exercises\n- Balance activities\n\nWhat type of exercise are you interested in?";

pub const GREETING_REPLY: &str = "Hello! I'm MediBot, your personal health assistant. How can I help you today? You can ask me about common symptoms, nutrition advice, exercise recommendations, or general health information.";

/// Keyword groups in priority order; the first group with any hit answers.
const RULES: &[(&[&str], &str)] = &[
    (&["headache"], HEADACHE_REPLY),
    (&["diet", "nutrition"], NUTRITION_REPLY),
    (&["exercise", "workout"], EXERCISE_REPLY),
];

pub fn respond(message: &str) -> &'static str {
    let lowered = message.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, reply)| *reply)
        .unwrap_or(GREETING_REPLY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_each_keyword_group() {
        assert!(respond("I have a headache").contains("headaches"));
        assert!(respond("what's a good diet").contains("balanced diet"));
        assert!(respond("Any NUTRITION tips?").contains("balanced diet"));
        assert!(respond("best workout plan").contains("Regular exercise"));
    }

    #[test]
    fn falls_back_to_greeting() {
        assert_eq!(respond("hello"), GREETING_REPLY);
        assert_eq!(respond(""), GREETING_REPLY);
    }

    #[test]
    fn earlier_group_wins_when_several_match() {
        assert_eq!(respond("exercise and diet for a headache"), HEADACHE_REPLY);
        assert_eq!(respond("workout diet"), NUTRITION_REPLY);
    }
}
