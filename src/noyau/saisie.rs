//! Contrôleur de saisie : une action utilisateur à la fois.
//!
//! Machine à états sur {tampon, jetons} + registre mémoire + historique.
//! Chaque action est traitée jusqu’au bout avant la suivante ; une erreur
//! laisse le flux intact et devient le message transitoire de l’état.

use super::erreur::ErreurCalc;
use super::eval::evaluer;
use super::format::format_nombre_avec;
use super::historique::{EntreeHistorique, JournalHistorique, StockageCle};
use super::jetons::{Cote, FluxJetons, Operateur};
use super::reglages::{Reglages, UniteAngle};

/// Sous cette valeur, cos(x) est considéré nul (tan indéfinie).
const EPSILON_COS: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fonction {
    Racine,
    Carre,
    Inverse,
    Sin,
    Cos,
    Tan,
    Ln,
    Log10,
}

impl Fonction {
    pub fn libelle(self) -> &'static str {
        match self {
            Fonction::Racine => "√",
            Fonction::Carre => "x²",
            Fonction::Inverse => "1/x",
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Ln => "ln",
            Fonction::Log10 => "log",
        }
    }

    /// Applique la fonction en vérifiant son domaine.
    pub fn appliquer(self, x: f64, unite: UniteAngle) -> Result<f64, ErreurCalc> {
        let angle = |x: f64| match unite {
            UniteAngle::Radians => x,
            UniteAngle::Degres => x.to_radians(),
        };

        let y = match self {
            Fonction::Racine => {
                if x < 0.0 {
                    return Err(ErreurCalc::InvalidFunctionInput);
                }
                x.sqrt()
            }
            Fonction::Carre => x * x,
            Fonction::Inverse => {
                if x == 0.0 {
                    return Err(ErreurCalc::InvalidFunctionInput);
                }
                1.0 / x
            }
            Fonction::Sin => angle(x).sin(),
            Fonction::Cos => angle(x).cos(),
            Fonction::Tan => {
                let a = angle(x);
                if a.cos().abs() < EPSILON_COS {
                    return Err(ErreurCalc::InvalidFunctionInput);
                }
                a.tan()
            }
            Fonction::Ln | Fonction::Log10 => {
                if x <= 0.0 {
                    return Err(ErreurCalc::InvalidFunctionInput);
                }
                if self == Fonction::Ln {
                    x.ln()
                } else {
                    x.log10()
                }
            }
        };

        if !y.is_finite() {
            return Err(ErreurCalc::InvalidFunctionInput);
        }
        Ok(y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionMemoire {
    Effacer,
    Rappeler,
    Ajouter,
    Soustraire,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Chiffre(char),
    Point,
    Operateur(Operateur),
    Egal,
    Effacer,
    Retour,
    ChangerSigne,
    Pourcent,
    Parenthese(Cote),
    Fonction(Fonction),
    Memoire(ActionMemoire),
}

/// Ce que la vue affiche, tel quel.
#[derive(Clone, Debug, PartialEq)]
pub struct EtatAffichage {
    pub texte_affichage: String,
    pub texte_equation: String,
    pub message_erreur: Option<String>,
    pub entrees_historique: Vec<EntreeHistorique>,
    pub valeur_memoire: Option<f64>,
}

/// D’où vient l’opérande d’une opération unaire.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Source {
    Tampon,
    /// Dernier jeton, retiré pour être remplacé.
    JetonFinal,
    /// Num plus ancien ("2 +") : lu, laissé en place.
    JetonAnterieur,
}

pub struct Controleur {
    flux: FluxJetons,
    memoire: Option<f64>,
    historique: JournalHistorique,
    erreur: Option<ErreurCalc>,
    reglages: Reglages,
}

impl Controleur {
    pub fn new(reglages: Reglages, stockage: Box<dyn StockageCle>) -> Self {
        let historique = JournalHistorique::ouvrir(stockage, reglages.historique_max);
        Self {
            flux: FluxJetons::new(),
            memoire: None,
            historique,
            erreur: None,
            reglages,
        }
    }

    pub fn reglages(&self) -> &Reglages {
        &self.reglages
    }

    pub fn flux(&self) -> &FluxJetons {
        &self.flux
    }

    pub fn memoire(&self) -> Option<f64> {
        self.memoire
    }

    pub fn historique(&self) -> &[EntreeHistorique] {
        self.historique.entrees()
    }

    /* ------------------------ Points d’entrée (présentation -> noyau) ------------------------ */

    /// Traite une action. L’erreur éventuelle est aussi conservée dans l’état.
    pub fn handle(&mut self, action: Action) -> Result<(), ErreurCalc> {
        tracing::debug!(?action, "action");
        self.erreur = None;
        let r = self.appliquer(action);
        if let Err(e) = &r {
            tracing::debug!(%e, "action refusée");
            self.erreur = Some(e.clone());
        }
        r
    }

    /// "=" : raccourci vers handle(Action::Egal), retourne la valeur.
    pub fn evaluate(&mut self) -> Result<f64, ErreurCalc> {
        self.erreur = None;
        let r = self.egal();
        if let Err(e) = &r {
            self.erreur = Some(e.clone());
        }
        r
    }

    /// Réinjecte le résultat d’une entrée d’historique dans le tampon.
    pub fn reuse_history_entry(&mut self, id: u64) -> Option<f64> {
        self.erreur = None;
        let v = self.historique.reuse(id)?;
        self.nouvelle_saisie();
        let texte = self.rendu(v);
        self.flux.set_valeur(v, texte);
        Some(v)
    }

    pub fn delete_history(&mut self, ids: &[u64]) -> usize {
        self.historique.delete(ids)
    }

    pub fn toggle_pin(&mut self, id: u64) -> bool {
        self.historique.toggle_pin(id)
    }

    /// Instantané de l’état observable.
    pub fn etat(&self) -> EtatAffichage {
        EtatAffichage {
            texte_affichage: self.texte_affichage(),
            texte_equation: self.flux.texte_equation(self.reglages.chiffres_fraction),
            message_erreur: self.erreur.as_ref().map(ToString::to_string),
            entrees_historique: self.historique.entrees().to_vec(),
            valeur_memoire: self.memoire,
        }
    }

    /// Tampon s’il y en a un, sinon dernier nombre engagé, sinon "0".
    pub fn texte_affichage(&self) -> String {
        if !self.flux.tampon_vide() {
            return self.flux.tampon().to_string();
        }
        match self.flux.last_number() {
            Some(v) => self.rendu(v),
            None => "0".to_string(),
        }
    }

    pub fn texte_equation(&self) -> String {
        self.flux.texte_equation(self.reglages.chiffres_fraction)
    }

    /* ------------------------ Actions ------------------------ */

    fn appliquer(&mut self, action: Action) -> Result<(), ErreurCalc> {
        match action {
            Action::Chiffre(d) => {
                self.nouvelle_saisie();
                if self.flux.chiffres_tampon() < self.reglages.chiffres_saisie_max {
                    self.flux.append_digit(d);
                }
            }
            Action::Point => {
                self.nouvelle_saisie();
                self.flux.append_decimal_point();
            }
            Action::Operateur(op) => {
                self.engager_operande()?;
                self.flux.push_operator(op);
            }
            Action::Egal => {
                self.egal()?;
            }
            Action::Effacer => self.flux.clear(),
            Action::Retour => self.flux.backspace(),
            Action::ChangerSigne => self.changer_signe()?,
            Action::Pourcent => {
                if self.sans_nombre() {
                    return Ok(());
                }
                self.transformer(|x| Ok(x / 100.0))?;
            }
            Action::Parenthese(Cote::Gauche) => {
                self.nouvelle_saisie();
                self.flux.commit()?;
                self.flux.push_parenthese(Cote::Gauche);
            }
            Action::Parenthese(Cote::Droite) => {
                if self.flux.balance() == 0 {
                    return Err(ErreurCalc::UnmatchedParenthesis);
                }
                self.engager_operande()?;
                self.flux.push_parenthese(Cote::Droite);
            }
            Action::Fonction(f) => {
                let unite = self.reglages.unite_angle;
                self.transformer(|x| f.appliquer(x, unite))?;
            }
            Action::Memoire(m) => self.memoire_action(m)?,
        }
        Ok(())
    }

    /// Commit réussi, ou tampon vide avec des jetons déjà engagés.
    fn engager_operande(&mut self) -> Result<(), ErreurCalc> {
        let engage = self.flux.commit()?;
        if !engage && self.flux.jetons().is_empty() {
            return Err(ErreurCalc::MissingOperand);
        }
        Ok(())
    }

    fn egal(&mut self) -> Result<f64, ErreurCalc> {
        self.engager_operande()?;

        let expression = self.texte_equation();
        let v = evaluer(self.flux.jetons())?;
        tracing::debug!(%expression, resultat = v, "évaluation");

        self.historique.record(expression, v);
        self.flux.reset_a(v);
        Ok(v)
    }

    /// Un résultat en fin de flux (tampon vide) ou une valeur du moteur dans le
    /// tampon : une nouvelle frappe le remplace.
    fn nouvelle_saisie(&mut self) {
        if self.flux.tampon_fige() {
            self.flux.vider_tampon();
        } else if self.flux.tampon_vide() && self.flux.finit_par_nombre() {
            self.flux.pop_last_number();
        }
    }

    /// Tampon, sinon dernier Num (retiré s’il termine le flux).
    fn operande(&mut self) -> Result<Option<(f64, Source)>, ErreurCalc> {
        if let Some(v) = self.flux.valeur_tampon()? {
            return Ok(Some((v, Source::Tampon)));
        }
        if let Some(v) = self.flux.pop_last_number() {
            return Ok(Some((v, Source::JetonFinal)));
        }
        Ok(self.flux.last_number().map(|v| (v, Source::JetonAnterieur)))
    }

    /// Remplace l’opérande par f(opérande) : valeur exacte dans le tampon, rendue pour l’affichage.
    /// Sans opérande : MissingOperand. En cas d’échec, le flux est restauré.
    fn transformer<F>(&mut self, f: F) -> Result<(), ErreurCalc>
    where
        F: FnOnce(f64) -> Result<f64, ErreurCalc>,
    {
        let (x, source) = self.operande()?.ok_or(ErreurCalc::MissingOperand)?;
        match f(x) {
            Ok(y) => {
                let texte = self.rendu(y);
                self.flux.set_valeur(y, texte);
                Ok(())
            }
            Err(e) => {
                if source == Source::JetonFinal {
                    self.flux.push_nombre(x);
                }
                Err(e)
            }
        }
    }

    /// ±. Sur le tampon : bascule du texte et de la valeur exacte. Sinon comme `transformer`.
    fn changer_signe(&mut self) -> Result<(), ErreurCalc> {
        if !self.flux.tampon_vide() {
            self.flux.toggle_sign_tampon();
            return Ok(());
        }
        if self.sans_nombre() {
            return Ok(());
        }
        self.transformer(|x| Ok(-x))
    }

    /// Ni tampon ni nombre engagé : ± et % n’ont rien à faire.
    fn sans_nombre(&self) -> bool {
        self.flux.tampon_vide() && self.flux.last_number().is_none()
    }

    fn memoire_action(&mut self, m: ActionMemoire) -> Result<(), ErreurCalc> {
        match m {
            ActionMemoire::Effacer => self.memoire = None,
            ActionMemoire::Rappeler => {
                if let Some(v) = self.memoire {
                    self.nouvelle_saisie();
                    let texte = self.rendu(v);
                    self.flux.set_valeur(v, texte);
                }
            }
            ActionMemoire::Ajouter | ActionMemoire::Soustraire => {
                let x = match self.flux.valeur_tampon()? {
                    Some(v) => v,
                    None => self.flux.last_number().unwrap_or(0.0),
                };
                let signe = if m == ActionMemoire::Ajouter { 1.0 } else { -1.0 };
                let somme = self.memoire.unwrap_or(0.0) + signe * x;
                if !somme.is_finite() {
                    return Err(ErreurCalc::NonFiniteResult);
                }
                self.memoire = Some(somme);
            }
        }
        Ok(())
    }

    fn rendu(&self, v: f64) -> String {
        format_nombre_avec(v, self.reglages.chiffres_fraction)
    }
}

impl Drop for Controleur {
    /// Vidage final de l’historique si une sauvegarde avait échoué.
    fn drop(&mut self) {
        self.historique.vider();
    }
}
