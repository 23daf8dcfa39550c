//! Operator log wording

use crate::ledger_client::LedgerResult;
use crate::undo_controller::UndoOutcome;

pub const FILL_ALL_FIELDS: &str = "❌ Заповніть всі поля";
pub const NOTHING_TO_UNDO: &str = "❌ Немає що відміняти";
pub const PICK_DATE: &str = "❌ Виберіть дату";
pub const PICK_CLIENT: &str = "❌ Виберіть клієнта";
pub const CAMERA_ON: &str = "📷 Камера увімкнена. Наведи на номер контейнера...";
pub const CAMERA_FAILED: &str = "❌ Не вдалося відкрити камеру";
pub const CAMERA_OFF: &str = "📵 Камеру вимкнено";

/// Result of a forward scan
pub fn scan_line(result: &LedgerResult) -> String {
    if result.has_progress() {
        format!("{} | Залишилось: {}", result.message, result.progress())
    } else {
        result.message.clone()
    }
}

/// Result of an undo
pub fn undo_line(outcome: &UndoOutcome) -> String {
    format!(
        "↩️ Відмінено: {} | Залишилось: {}",
        outcome.reverted.quantity,
        outcome.result.progress()
    )
}

pub fn recognized(container: &str) -> String {
    format!("📄 Розпізнано: {}", container)
}

pub fn orders_loaded(count: usize) -> String {
    format!("✔ Завантажено клієнтів: {}", count)
}

pub fn finished(client: &str) -> String {
    format!("✔ Завершено: {}", client)
}

pub fn server_error(detail: impl std::fmt::Display) -> String {
    format!("❌ Помилка сервера: {}", detail)
}

pub fn pairing(url: &str) -> String {
    format!("🔗 Сканер: {}", url)
}
