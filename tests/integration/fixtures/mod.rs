// Abridged play pages in the théâtre-documentation markup
// WHY: each page exercises one structural shape end to end with known expected counts

/// Two acts, verse, a declared scene list, one misspelled and one undeclared speaker
pub const DEPIT_AMOUREUX: &str = r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Le Dépit amoureux (MOLIÈRE) | théâtre-documentation.com</title>
</head>
<body>
<div class='toc-list'>
<ul>
<li class="toc-level-1"><a href="#acte-1"><strong>ACTE I</strong></a>
<ul>
<li class="toc-level-2"><a href="#scene-1-1"><strong>Scène première</strong></a></li>
<li class="toc-level-2"><a href="#scene-1-2"><strong>Scène II</strong></a></li>
</ul>
</li>
<li class="toc-level-1"><a href="#acte-2"><strong>ACTE II</strong></a>
<ul>
<li class="toc-level-2"><a href="#scene-2-1"><strong>Scène première</strong></a></li>
</ul>
</li>
</ul>
</div>
<p>Comédie en deux actes, en vers.</p>
<p>Représentée pour la première fois à Béziers le 16 décembre 1656.</p>
<p> </p>
<p><strong><em>Personnages</em></strong></p>
<p>ALBERT, père de Lucile.</p>
<p>LUCILE, fille d'Albert.</p>
<p>ÉRASTE, amant de Lucile.</p>
<p>GROS-RENÉ, valet d'Éraste.</p>
<p> </p>
<p>La scène est à Paris.</p>
<h1><strong>ACTE I</strong></h1>
<p align="center" style="text-align:center">Une rue.</p>
<h2 class="rtecenter"><strong>Scène première</strong></h2>
<p align="center" style="text-align:center">ÉRASTE, GROS-RENÉ.</p>
<p align="center" style="text-align:center">ÉRASTE.</p>
<p>Veux-tu que je te dise ? une atteinte secrète</p>
<p>Ne laisse point mon âme en une bonne assiette.</p>
<p align="center" style="text-align:center">GROS-RENÉ.</p>
<p>Quoi ! vous êtes jaloux ?</p>
<h2 class="rtecenter"><strong>Scène II</strong></h2>
<p align="center" style="text-align:center">MASCARILLE.</p>
<p>Hé, monsieur ! <em>(Il salue.)</em></p>
<p><em>Il sort.</em></p>
<h1><strong>ACTE II</strong></h1>
<h2 class="rtecenter"><strong>Scène première</strong></h2>
<p align="center" style="text-align:center">LUCILLE, <em>seule</em>.</p>
<p>Il m'aime, je le vois.</p>
<p> </p>
</body>
</html>
"##;

/// One act preceded by a dedication announced in the scene list
pub const FACHEUX: &str = r##"<html>
<head>
<title>Les Fâcheux (MOLIÈRE) | théâtre-documentation.com</title>
</head>
<body>
<div class='toc-list'>
<ul>
<li class="toc-level-1"><a href="#dedicace"><strong>AU ROI</strong></a></li>
<li class="toc-level-1"><a href="#acte-1"><strong>ACTE I</strong></a>
<ul>
<li class="toc-level-2"><a href="#scene-1-1"><strong>Scène première</strong></a></li>
</ul>
</li>
</ul>
</div>
<p>Comédie en trois actes, en vers.</p>
<p>Représentée pour la première fois à Vaux le 17 août 1661.</p>
<p> </p>
<p><strong><em>Personnages</em></strong></p>
<p>ÉRASTE, amoureux d'Orphise.</p>
<p>LA MONTAGNE, valet d'Éraste.</p>
<p> </p>
<h1>AU ROI</h1>
<p>SIRE,</p>
<p>J'ajoute une scène à la comédie.</p>
<p> </p>
<h1><strong>ACTE I</strong></h1>
<h2 class="rtecenter"><strong>Scène première</strong></h2>
<p align="center" style="text-align:center">ÉRASTE, LA MONTAGNE.</p>
<p align="center" style="text-align:center">ÉRASTE.</p>
<p>Sous quel astre, bon Dieu, faut-il que je sois né,</p>
<p align="center" style="text-align:center">LA MONTAGNE.</p>
<p>Monsieur, tout doucement.</p>
</body>
</html>
"##;

/// Dedication heading line of [`FACHEUX`]; removing it leaves the dedication uncollected
pub const FACHEUX_DEDICATION_HEADING: &str = "<h1>AU ROI</h1>\n";

/// Scenes without any act heading and no scene list
pub const JALOUSIE_BARBOUILLE: &str = r##"<html>
<head>
<title>La Jalousie du Barbouillé (MOLIÈRE) | théâtre-documentation.com</title>
</head>
<body>
<p>Farce en un acte, en prose.</p>
<p> </p>
<p><strong><em>Personnages</em></strong></p>
<p>LE BARBOUILLÉ, mari d'Angélique.</p>
<p>ANGÉLIQUE, femme du Barbouillé.</p>
<p> </p>
<h2 class="rtecenter"><strong>Scène première</strong></h2>
<p align="center" style="text-align:center">LE BARBOUILLÉ.</p>
<p>Il faut avouer que je suis le plus malheureux de tous les hommes.</p>
<h2 class="rtecenter"><strong>Scène II</strong></h2>
<p align="center" style="text-align:center">ANGÉLIQUE.</p>
<p>Voyez le beau mari !</p>
</body>
</html>
"##;

/// Scene list declares acts but a scene heading comes first in the body
pub const SCENE_BEFORE_ACT: &str = r##"<html>
<head>
<title>Le Sicilien (MOLIÈRE) | théâtre-documentation.com</title>
</head>
<body>
<div class='toc-list'>
<ul>
<li class="toc-level-1"><a href="#acte-1"><strong>ACTE I</strong></a>
<ul>
<li class="toc-level-2"><a href="#scene-1-1"><strong>Scène première</strong></a></li>
</ul>
</li>
</ul>
</div>
<p>Comédie en un acte, en prose.</p>
<p> </p>
<h2 class="rtecenter"><strong>Scène première</strong></h2>
<p align="center" style="text-align:center">HALI.</p>
<p>Chut. N'avancez pas davantage.</p>
</body>
</html>
"##;
