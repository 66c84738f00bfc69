//! Chat-facing texts.

pub use crate::store::NO_PHRASES;

pub const REMEMBERED: &str = "Запомнил :)";
pub const ADMIN_ONLY: &str = "Я запоминаю фразы только от админа!";
pub const ASK_PHRASE: &str = "Какую фразу запомнить?";
pub const NOT_UNDERSTOOD: &str = "Не понимаю :(\nНапиши /start чтобы увидеть подсказку";

/// Greeting shown on `/start`; the admin also learns how to teach phrases.
pub fn greeting(
    speak_phrase: &str,
    speak_command: &str,
    remember_phrase: &str,
    is_admin: bool,
) -> String {
    let mut text = format!(
        "Привет, я говорю случайными фразами. Чтобы получить случайную фразу, напиши мне `{speak_phrase}`"
    );
    text.push_str(&format!(
        "\nЕще меня можно добавить в группу и использовать команду {speak_command}"
    ));
    if is_admin {
        text.push_str(&format!(
            "\nЧтобы добавить новую фразу, напиши `{remember_phrase}`"
        ));
    }
    text
}
