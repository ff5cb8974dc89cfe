//! Localized user-facing strings with an explicit fallback chain.
//!
//! Every localized text on the site is resolved through [`TextCatalog::resolve`]:
//!
//! 1. exact locale (`es-MX`)
//! 2. base language (`es`)
//! 3. default language (`en`)
//! 4. the literal key
//!
//! so a missing translation degrades to English, and a missing key is visible
//! as itself instead of an empty string.

use crate::i18n::code;
use std::collections::HashMap;

/// Keyed translation table.
#[derive(Debug, Clone)]
pub struct TextCatalog {
    default_language: String,
    /// key -> normalized locale code -> text
    texts: HashMap<String, HashMap<String, String>>,
}

impl TextCatalog {
    /// Create an empty catalog falling back to `default_language`.
    pub fn new(default_language: &str) -> Self {
        Self {
            default_language: code::normalize(default_language),
            texts: HashMap::new(),
        }
    }

    /// Add or replace one translation.
    pub fn insert(&mut self, key: &str, locale: &str, text: &str) {
        self.texts
            .entry(key.to_string())
            .or_default()
            .insert(code::normalize(locale), text.to_string());
    }

    /// Add every `(locale, text)` pair for `key`.
    pub fn with_translations(mut self, key: &str, translations: &[(&str, &str)]) -> Self {
        for (locale, text) in translations {
            self.insert(key, locale, text);
        }
        self
    }

    /// Resolve `key` for `locale` through the fallback chain.
    pub fn resolve<'a>(&'a self, key: &'a str, locale: &str) -> &'a str {
        let Some(translations) = self.texts.get(key) else {
            return key;
        };

        let locale = code::normalize(locale);
        let base = code::base_language(&locale);

        translations
            .get(&locale)
            .or_else(|| translations.get(base))
            .or_else(|| translations.get(&self.default_language))
            .map(String::as_str)
            .unwrap_or(key)
    }

    /// Whether any translation exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.texts.contains_key(key)
    }

    /// Site strings shipped with the service.
    pub fn builtin() -> Self {
        Self::new("en")
            // ==================== Price Labels ====================
            .with_translations(
                "price.free",
                &[
                    ("en", "Free"),
                    ("es", "Gratis"),
                    ("fr", "Gratuit"),
                    ("de", "Kostenlos"),
                    ("pt", "Grátis"),
                    ("it", "Gratuito"),
                    ("ar", "مجاني"),
                    ("zh", "免费"),
                    ("ja", "無料"),
                    ("ko", "무료"),
                    ("nl", "Gratis"),
                    ("ru", "Бесплатно"),
                    ("hi", "मुफ़्त"),
                    ("ur", "مفت"),
                ],
            )
            .with_translations(
                "price.custom",
                &[
                    ("en", "Custom"),
                    ("es", "Personalizado"),
                    ("fr", "Personnalisé"),
                    ("de", "Individuell"),
                    ("pt", "Personalizado"),
                    ("it", "Personalizzato"),
                    ("ar", "مخصص"),
                    ("zh", "定制"),
                    ("ja", "カスタム"),
                    ("ko", "맞춤형"),
                    ("nl", "Op maat"),
                    ("ru", "Индивидуально"),
                    ("hi", "कस्टम"),
                    ("ur", "حسب ضرورت"),
                ],
            )
            // ==================== Plan Names ====================
            .with_translations(
                "plan.free.name",
                &[
                    ("en", "Free"),
                    ("es", "Gratis"),
                    ("fr", "Gratuit"),
                    ("de", "Kostenlos"),
                    ("pt", "Grátis"),
                    ("it", "Gratuito"),
                    ("ar", "مجاني"),
                    ("zh", "免费"),
                    ("ja", "無料"),
                    ("ko", "무료"),
                    ("nl", "Gratis"),
                    ("ru", "Бесплатно"),
                    ("hi", "मुफ़्त"),
                    ("ur", "مفت"),
                ],
            )
            .with_translations(
                "plan.starter.name",
                &[
                    ("en", "Starter"),
                    ("es", "Inicial"),
                    ("fr", "Débutant"),
                    ("de", "Starter"),
                    ("pt", "Iniciante"),
                    ("it", "Base"),
                    ("ar", "المبتدئ"),
                    ("zh", "入门版"),
                    ("ja", "スターター"),
                    ("ko", "스타터"),
                    ("nl", "Starter"),
                    ("ru", "Стартовый"),
                    ("hi", "शुरुआती"),
                    ("ur", "ابتدائی"),
                ],
            )
            .with_translations(
                "plan.professional.name",
                &[
                    ("en", "Professional"),
                    ("es", "Profesional"),
                    ("fr", "Professionnel"),
                    ("de", "Professionell"),
                    ("pt", "Profissional"),
                    ("it", "Professionale"),
                    ("ar", "احترافي"),
                    ("zh", "专业版"),
                    ("ja", "プロフェッショナル"),
                    ("ko", "프로페셔널"),
                    ("nl", "Professioneel"),
                    ("ru", "Профессиональный"),
                    ("hi", "पेशेवर"),
                    ("ur", "پیشہ ورانہ"),
                ],
            )
            .with_translations(
                "plan.enterprise.name",
                &[
                    ("en", "Enterprise"),
                    ("es", "Empresarial"),
                    ("fr", "Entreprise"),
                    ("de", "Unternehmen"),
                    ("pt", "Empresarial"),
                    ("it", "Enterprise"),
                    ("ar", "للشركات"),
                    ("zh", "企业版"),
                    ("ja", "エンタープライズ"),
                    ("ko", "엔터프라이즈"),
                    ("nl", "Enterprise"),
                    ("ru", "Корпоративный"),
                    ("hi", "उद्यम"),
                    ("ur", "انٹرپرائز"),
                ],
            )
            // ==================== Plan Calls To Action ====================
            .with_translations(
                "plan.free.cta",
                &[
                    ("en", "Get Started Free"),
                    ("es", "Comenzar Gratis"),
                    ("fr", "Commencer Gratuitement"),
                    ("de", "Kostenlos Starten"),
                    ("pt", "Começar Grátis"),
                    ("ur", "مفت شروع کریں"),
                ],
            )
            .with_translations(
                "plan.starter.cta",
                &[
                    ("en", "Start 7-Day Trial"),
                    ("es", "Prueba 7 Días Gratis"),
                    ("fr", "Essai Gratuit 7 Jours"),
                    ("de", "7-Tage-Test Starten"),
                    ("pt", "Teste 7 Dias Grátis"),
                    ("ur", "7 دن کی آزمائش شروع کریں"),
                ],
            )
            .with_translations(
                "plan.professional.cta",
                &[
                    ("en", "Start Free Trial"),
                    ("es", "Prueba Gratis"),
                    ("fr", "Essai Gratuit"),
                    ("de", "Kostenlos Testen"),
                    ("pt", "Teste Grátis"),
                    ("ur", "مفت آزمائش شروع کریں"),
                ],
            )
            .with_translations(
                "plan.enterprise.cta",
                &[
                    ("en", "Contact Sales"),
                    ("es", "Contactar Ventas"),
                    ("fr", "Contacter les Ventes"),
                    ("de", "Vertrieb Kontaktieren"),
                    ("pt", "Contatar Vendas"),
                    ("ur", "سیلز سے رابطہ کریں"),
                ],
            )
            // ==================== Page Metadata ====================
            .with_translations(
                "meta.title",
                &[
                    ("en", "Zynstro - AI Business Name Generator | Find Perfect Brand Names"),
                    ("es", "Zynstro - Generador de Nombres Comerciales con IA | Encuentra Nombres de Marca Perfectos"),
                    ("fr", "Zynstro - Générateur de Noms d'Entreprise IA | Trouvez des Noms de Marque Parfaits"),
                    ("de", "Zynstro - KI Business-Namensgenerator | Finden Sie perfekte Markennamen"),
                    ("pt", "Zynstro - Gerador de Nomes Comerciais com IA | Encontre Nomes de Marca Perfeitos"),
                    ("it", "Zynstro - Generatore di Nomi Aziendali IA | Trova Nomi di Brand Perfetti"),
                    ("ja", "Zynstro - AIビジネスネームジェネレーター | 完璧なブランド名を見つけよう"),
                ],
            )
    }
}
