use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Ru,
    En,
}

static CURRENT_LANG: AtomicU8 = AtomicU8::new(0); // 0=Ru (default)

pub fn lang() -> Lang {
    match CURRENT_LANG.load(Ordering::Relaxed) {
        1 => Lang::En,
        _ => Lang::Ru,
    }
}

pub fn set_lang(l: Lang) {
    CURRENT_LANG.store(
        match l {
            Lang::Ru => 0,
            Lang::En => 1,
        },
        Ordering::Relaxed,
    );
}

/// Translate a key to the current language.
pub fn t(key: &str) -> &'static str {
    let ru = lang() == Lang::Ru;
    match key {
        // ── Main menus ──────────────────────────────────────
        "menu.file" => if ru { "Файл" } else { "File" },
        "menu.open" => if ru { "Открыть модель...  Ctrl+O" } else { "Open Model...  Ctrl+O" },
        "menu.open_title" => if ru { "Открыть 3D модель" } else { "Open 3D Model" },
        "menu.clear" => if ru { "Закрыть модель  Del" } else { "Clear Model  Del" },
        "menu.quit" => if ru { "Выход" } else { "Quit" },

        "menu.view" => if ru { "Вид" } else { "View" },
        "menu.grid" => if ru { "Сетка" } else { "Grid" },
        "menu.reset_camera" => if ru { "Сбросить камеру  R" } else { "Reset camera  R" },
        "menu.language" => if ru { "Язык" } else { "Language" },

        "menu.settings" => if ru { "Настройки" } else { "Settings" },
        "menu.preferences" => if ru { "Параметры..." } else { "Preferences..." },

        "dialog.models" => if ru { "3D модели" } else { "3D models" },

        // ── Notices ─────────────────────────────────────────
        "notice.loaded" => if ru { "Модель загружена" } else { "Model loaded" },
        "notice.failed" => if ru { "Ошибка загрузки" } else { "Failed to load model" },
        "notice.cleared" => if ru { "Модель закрыта" } else { "Model cleared" },

        // ── Model info ──────────────────────────────────────
        "info.title" => if ru { "Модель" } else { "Model" },
        "info.loading" => if ru { "Загрузка..." } else { "Loading..." },
        "info.no_model" => if ru { "Модель не загружена" } else { "No model loaded" },
        "info.size" => if ru { "Размер" } else { "Size" },
        "info.meshes" => if ru { "Сетки" } else { "Meshes" },
        "info.triangles" => if ru { "Треугольники" } else { "Triangles" },
        "info.detected" => if ru { "Формат" } else { "Format" },
        "info.by_content" => if ru { "определён по содержимому" } else { "detected from content" },

        // ── Controls ────────────────────────────────────────
        "controls.title" => if ru { "Отображение" } else { "Display" },
        "controls.wireframe" => if ru { "Каркас  W" } else { "Wireframe  W" },
        "controls.environment" => if ru { "Окружение" } else { "Environment" },
        "controls.clear" => if ru { "Закрыть модель" } else { "Clear Model" },
        "controls.reset_camera" => if ru { "Сбросить камеру" } else { "Reset camera" },
        "controls.help" => if ru { "Управление" } else { "Controls" },

        "help.rotate" => if ru { "ЛКМ + перетаскивание: вращение" } else { "Left drag: rotate" },
        "help.pan" => if ru { "ПКМ + перетаскивание: сдвиг" } else { "Right drag: pan" },
        "help.zoom" => if ru { "Колесо: масштаб" } else { "Scroll: zoom" },
        "help.click" => if ru { "Клик: выделить деталь" } else { "Click: highlight a part" },
        "help.drop" => if ru { "Перетащите файл в окно для загрузки" } else { "Drop a file on the window to load it" },

        // ── Cross-section ───────────────────────────────────
        "section.title" => if ru { "Сечение" } else { "Cross-Section" },
        "section.highlight" => if ru { "Выделение по клику  H" } else { "Enable Click Highlight  H" },
        "section.enable" => if ru { "Включить сечение  C" } else { "Enable Cross-Section  C" },
        "section.axis" => if ru { "Ось" } else { "Axis" },
        "section.position" => if ru { "Положение" } else { "Position" },

        // ── Viewport ────────────────────────────────────────
        "viewport.empty_hint" => if ru { "Загрузите 3D модель, чтобы начать" } else { "Upload a 3D model to get started" },
        "viewport.loading" => if ru { "Загрузка модели..." } else { "Loading model..." },
        "viewport.nav_hint" => if ru { "GLB, glTF или STL: Ctrl+O или перетащите файл" } else { "GLB, glTF or STL: Ctrl+O or drop a file" },

        // ── Status bar ──────────────────────────────────────
        "status.meshes" => if ru { "Сетки" } else { "Meshes" },
        "status.selected" => if ru { "Выделено" } else { "Selected" },
        "status.loading" => if ru { "Загрузка..." } else { "Loading..." },
        "status.ready" => if ru { "Готово" } else { "Ready" },

        // ── Settings ────────────────────────────────────────
        "settings.title" => if ru { "Настройки" } else { "Settings" },

        "settings.viewport" => if ru { "Вьюпорт" } else { "Viewport" },
        "settings.highlight_color" => if ru { "Цвет выделения" } else { "Highlight color" },
        "settings.antialiasing" => if ru { "Сглаживание" } else { "Anti-aliasing" },
        "settings.grid_visible" => if ru { "Показывать сетку" } else { "Show grid" },
        "settings.grid_size" => if ru { "Шаг сетки" } else { "Grid cell size" },
        "settings.grid_range" => if ru { "Размер сетки" } else { "Grid range" },
        "settings.grid_opacity" => if ru { "Прозрачность сетки" } else { "Grid opacity" },

        "settings.loading" => if ru { "Загрузка" } else { "Loading" },
        "settings.probe_order" => if ru { "Порядок определения формата" } else { "Format probe order" },
        "settings.stl_first" => if ru { "Сначала STL" } else { "STL first" },
        "settings.gltf_first" => if ru { "Сначала glTF" } else { "glTF first" },
        "settings.timeout" => if ru { "Тайм-аут (сек.)" } else { "Timeout (s)" },

        "settings.camera" => if ru { "Камера" } else { "Camera" },
        "settings.damping" => if ru { "Инерция вращения" } else { "Rotation damping" },

        "settings.ui" => if ru { "Интерфейс" } else { "Interface" },
        "settings.font_size" => if ru { "Размер шрифта" } else { "Font size" },
        "settings.default_environment" => if ru { "Окружение по умолчанию" } else { "Default environment" },

        "settings.apply" => if ru { "Применить" } else { "Apply" },
        "settings.reset" => if ru { "Сбросить" } else { "Reset" },
        "settings.close" => if ru { "Закрыть" } else { "Close" },

        // ── Fallback ────────────────────────────────────────
        _ => "???",
    }
}
