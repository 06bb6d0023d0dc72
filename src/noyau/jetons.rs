// src/noyau/jetons.rs
//
// Jetons + flux de saisie.
//
// Deux champs distincts :
// - `jetons`  : ce qui est déjà engagé (Num / Op / Par)
// - `tampon`  : le nombre en cours de frappe (texte)
//   ou une valeur produite par le moteur (texte rendu + f64 exact)
// Un nombre n’existe jamais dans les deux à la fois : `commit()` est la seule
// transition tampon -> jeton.

use super::erreur::ErreurCalc;
use super::format::format_nombre_avec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operateur {
    Plus,
    Moins,
    Fois,
    Divise,
}

impl Operateur {
    /// Glyphe affiché dans l’équation.
    pub fn symbole(self) -> &'static str {
        match self {
            Operateur::Plus => "+",
            Operateur::Moins => "−",
            Operateur::Fois => "×",
            Operateur::Divise => "÷",
        }
    }

    /// 1 = additif, 2 = multiplicatif. Pas d’exposant, tout est associatif à gauche.
    pub fn precedence(self) -> u8 {
        match self {
            Operateur::Plus | Operateur::Moins => 1,
            Operateur::Fois | Operateur::Divise => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cote {
    Gauche,
    Droite,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tok {
    Num(f64),
    Op(Operateur),
    Par(Cote),
}

/// Format utilitaire : liste de jetons en texte ("2 + ( 3 × 4 )").
pub fn format_tokens(tokens: &[Tok], chiffres: usize) -> String {
    let mut out = Vec::with_capacity(tokens.len());
    for t in tokens {
        let s = match t {
            Tok::Num(v) => format_nombre_avec(*v, chiffres),
            Tok::Op(op) => op.symbole().to_string(),
            Tok::Par(Cote::Gauche) => "(".to_string(),
            Tok::Par(Cote::Droite) => ")".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}

/// Nombre de "(" non refermées (jamais négatif : une ")" orpheline compte 0).
pub fn balance(tokens: &[Tok]) -> usize {
    let mut ouvertes: usize = 0;
    for t in tokens {
        match t {
            Tok::Par(Cote::Gauche) => ouvertes += 1,
            Tok::Par(Cote::Droite) => ouvertes = ouvertes.saturating_sub(1),
            Tok::Num(_) | Tok::Op(_) => {}
        }
    }
    ouvertes
}

#[derive(Clone, Debug, Default)]
pub struct FluxJetons {
    jetons: Vec<Tok>,
    tampon: String,
    /// Valeur exacte quand le tampon vient du moteur : le texte n’est qu’un rendu.
    exacte: Option<f64>,
}

impl FluxJetons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jetons(&self) -> &[Tok] {
        &self.jetons
    }

    pub fn tampon(&self) -> &str {
        &self.tampon
    }

    pub fn tampon_vide(&self) -> bool {
        self.tampon.is_empty()
    }

    /// Vrai si le tampon est une valeur du moteur (résultat de fonction, MR...).
    pub fn tampon_fige(&self) -> bool {
        self.exacte.is_some()
    }

    /// Nombre de chiffres déjà tapés (signe et point exclus).
    pub fn chiffres_tampon(&self) -> usize {
        self.tampon.chars().filter(|c| c.is_ascii_digit()).count()
    }

    /* ------------------------ Tampon ------------------------ */

    /// Ajoute un chiffre. "0" seul (ou "-0") est remplacé plutôt que prolongé.
    pub fn append_digit(&mut self, d: char) {
        if !d.is_ascii_digit() {
            return;
        }
        match self.tampon.as_str() {
            "0" => self.tampon.clear(),
            "-0" => self.tampon.truncate(1),
            _ => {}
        }
        self.tampon.push(d);
    }

    /// Point décimal : ignoré s’il y en a déjà un, "0" amorcé si rien avant.
    pub fn append_decimal_point(&mut self) {
        if self.tampon.contains('.') {
            return;
        }
        if self.tampon.is_empty() || self.tampon == "-" {
            self.tampon.push('0');
        }
        self.tampon.push('.');
    }

    /// Retire le dernier caractère du tampon. Ne touche jamais aux jetons.
    /// Un "-" resté seul ou un exposant vide ("1.5e") n’ont pas de sens : on les retire aussi.
    /// Une valeur du moteur redevient du texte tapé.
    pub fn backspace(&mut self) {
        self.exacte = None;
        self.tampon.pop();
        if self.tampon.ends_with("e-") {
            self.tampon.truncate(self.tampon.len() - 2);
        } else if self.tampon.ends_with('e') {
            self.tampon.pop();
        }
        if self.tampon == "-" {
            self.tampon.clear();
        }
    }

    /// Inverse le signe du texte du tampon (x -> -x -> x, au caractère près).
    /// Une valeur du moteur est niée aussi : -(-x) == x au bit près.
    pub fn toggle_sign_tampon(&mut self) {
        if self.tampon.is_empty() {
            return;
        }
        if let Some(v) = self.exacte.as_mut() {
            *v = -*v;
        }
        if let Some(reste) = self.tampon.strip_prefix('-') {
            self.tampon = reste.to_string();
        } else {
            self.tampon.insert(0, '-');
        }
    }

    /// Remplace le tampon par un texte tapé.
    pub fn set_tampon(&mut self, texte: String) {
        self.tampon = texte;
        self.exacte = None;
    }

    /// Valeur du moteur : `texte` pour l’affichage, `v` pour le calcul.
    pub fn set_valeur(&mut self, v: f64, texte: String) {
        self.tampon = texte;
        self.exacte = Some(v);
    }

    /// Abandonne le tampon (nouvelle frappe après une valeur du moteur).
    pub fn vider_tampon(&mut self) {
        self.tampon.clear();
        self.exacte = None;
    }

    /// Lecture du tampon sans l’engager. "1e400" (infini) n’est pas un nombre saisissable.
    pub fn valeur_tampon(&self) -> Result<Option<f64>, ErreurCalc> {
        if self.tampon.is_empty() {
            return Ok(None);
        }
        if let Some(v) = self.exacte {
            return Ok(Some(v));
        }
        match self.tampon.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(ErreurCalc::InvalidNumberFormat(self.tampon.clone())),
        }
    }

    /// Tampon -> Num. Ok(false) si le tampon était vide (pas une erreur).
    /// En cas d’échec, le tampon est conservé tel quel.
    pub fn commit(&mut self) -> Result<bool, ErreurCalc> {
        match self.valeur_tampon()? {
            None => Ok(false),
            Some(v) => {
                self.jetons.push(Tok::Num(v));
                self.vider_tampon();
                Ok(true)
            }
        }
    }

    /* ------------------------ Jetons ------------------------ */

    /// Un nouvel opérateur remplace un opérateur en fin de liste (changement d’avis).
    pub fn push_operator(&mut self, op: Operateur) {
        if let Some(Tok::Op(dernier)) = self.jetons.last_mut() {
            *dernier = op;
            return;
        }
        self.jetons.push(Tok::Op(op));
    }

    pub fn push_parenthese(&mut self, cote: Cote) {
        self.jetons.push(Tok::Par(cote));
    }

    /// Balayage à plat depuis la fin : dernier Num engagé, où qu’il soit.
    pub fn last_number(&self) -> Option<f64> {
        self.jetons.iter().rev().find_map(|t| match t {
            Tok::Num(v) => Some(*v),
            _ => None,
        })
    }

    /// Remet un Num en fin de liste (restauration après une fonction refusée).
    pub fn push_nombre(&mut self, v: f64) {
        self.jetons.push(Tok::Num(v));
    }

    /// Vrai si le dernier jeton est un Num (résultat, valeur réutilisée...).
    pub fn finit_par_nombre(&self) -> bool {
        matches!(self.jetons.last(), Some(Tok::Num(_)))
    }

    /// Retire le dernier jeton seulement si c’est un Num.
    pub fn pop_last_number(&mut self) -> Option<f64> {
        if let Some(Tok::Num(v)) = self.jetons.last() {
            let v = *v;
            self.jetons.pop();
            return Some(v);
        }
        None
    }

    pub fn balance(&self) -> usize {
        balance(&self.jetons)
    }

    /// Remplace tout le flux par un seul nombre (graine du calcul suivant).
    pub fn reset_a(&mut self, v: f64) {
        self.jetons.clear();
        self.jetons.push(Tok::Num(v));
        self.vider_tampon();
    }

    pub fn clear(&mut self) {
        self.jetons.clear();
        self.vider_tampon();
    }

    /// Jetons rendus + tampon, séparés par une espace.
    pub fn texte_equation(&self, chiffres: usize) -> String {
        let mut s = format_tokens(&self.jetons, chiffres);
        if !self.tampon.is_empty() {
            if !s.is_empty() {
                s.push(' ');
            }
            s.push_str(&self.tampon);
        }
        s
    }
}
